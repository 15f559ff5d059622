use super::Network;
use crate::ledger::PermitSignature;
use amm_network_domain::enums::FeeType;
use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::events::NetworkEvent;
use amm_network_domain::pool::TradeAmountsAndFee;
use amm_network_domain::token::{Address, Token};
use amm_network_domain::value_objects::{ContextId, ContextIdBuilder};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Parameters of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeParams {
    pub source_token: Token,
    pub target_token: Token,
    pub source_amount: U256,
    /// Smallest acceptable output.
    pub min_return_amount: U256,
    /// Last timestamp at which the trade may execute.
    pub deadline: u64,
    /// Receiver of the output; the trader when unset.
    pub beneficiary: Option<Address>,
}

/// One pool traversal of a route.
#[derive(Debug, Clone, Copy)]
struct Hop {
    index: usize,
    pool: Token,
    source_token: Token,
    target_token: Token,
}

impl Network {
    /// Trades through one pool, or two pools via the network token, and
    /// returns the amount sent to the beneficiary.
    pub fn trade(
        &mut self,
        caller: Address,
        params: TradeParams,
        value: U256,
    ) -> NetworkResult<U256> {
        let _lock = self.guard.enter()?;
        self.trade_inner(caller, params, value, None)
    }

    /// Like [`Network::trade`], with the allowance granted by a signed
    /// permit. Not available for the native token.
    pub fn trade_permitted(
        &mut self,
        caller: Address,
        params: TradeParams,
        signature: &PermitSignature,
    ) -> NetworkResult<U256> {
        let _lock = self.guard.enter()?;
        if params.source_token.is_native() {
            return Err(NetworkError::PermitUnsupported);
        }
        self.trade_inner(caller, params, U256::zero(), Some(signature))
    }

    /// Output amount and fee of a trade. For double-hop trades the fee is the
    /// one taken by the final hop, in target tokens.
    pub fn target_amount_and_fee(
        &self,
        source_token: Token,
        target_token: Token,
        source_amount: U256,
    ) -> NetworkResult<TradeAmountsAndFee> {
        let hops = self.route(source_token, target_token)?;
        let quotes = self.quote_hops(&hops, source_amount)?;
        quotes.last().copied().ok_or(NetworkError::InvalidPool)
    }

    /// Input amount needed to receive `target_amount`, and the fee taken by
    /// the final hop.
    pub fn source_amount_and_fee(
        &self,
        source_token: Token,
        target_token: Token,
        target_amount: U256,
    ) -> NetworkResult<TradeAmountsAndFee> {
        let hops = self.route(source_token, target_token)?;
        let mut amount = target_amount;
        let mut final_fee = None;
        for hop in hops.iter().rev() {
            let quote = self.collections[hop.index].source_amount_and_fee(
                hop.source_token,
                hop.target_token,
                amount,
            )?;
            final_fee.get_or_insert(quote.fee_amount);
            amount = quote.amount;
        }
        Ok(TradeAmountsAndFee {
            amount,
            fee_amount: final_fee.unwrap_or_default(),
        })
    }

    fn route(&self, source_token: Token, target_token: Token) -> NetworkResult<Vec<Hop>> {
        if source_token == target_token {
            return Err(NetworkError::InvalidToken);
        }
        let network_token = self.config.network_token;
        let hop = |pool: Token, source_token: Token, target_token: Token| {
            self.collection_for_pool(pool).map(|index| Hop {
                index,
                pool,
                source_token,
                target_token,
            })
        };

        if source_token == network_token {
            Ok(vec![hop(target_token, source_token, target_token)?])
        } else if target_token == network_token {
            Ok(vec![hop(source_token, source_token, target_token)?])
        } else {
            Ok(vec![
                hop(source_token, source_token, network_token)?,
                hop(target_token, network_token, target_token)?,
            ])
        }
    }

    fn quote_hops(&self, hops: &[Hop], source_amount: U256) -> NetworkResult<Vec<TradeAmountsAndFee>> {
        let mut amount = source_amount;
        let mut quotes = Vec::with_capacity(hops.len());
        for hop in hops {
            let quote = self.collections[hop.index].target_amount_and_fee(
                hop.source_token,
                hop.target_token,
                amount,
            )?;
            amount = quote.amount;
            quotes.push(quote);
        }
        Ok(quotes)
    }

    fn trade_inner(
        &mut self,
        caller: Address,
        params: TradeParams,
        value: U256,
        permit: Option<&PermitSignature>,
    ) -> NetworkResult<U256> {
        if params.source_amount.is_zero() || params.min_return_amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        let now = self.clock.now();
        if params.deadline < now {
            return Err(NetworkError::ExpiredDeadline);
        }
        let beneficiary = params.beneficiary.unwrap_or(caller);
        if beneficiary.is_zero() {
            return Err(NetworkError::InvalidAddress);
        }
        let hops = self.route(params.source_token, params.target_token)?;
        Self::ensure_value(params.source_token, params.source_amount, value)?;

        let quotes = self.quote_hops(&hops, params.source_amount)?;
        if quotes.iter().any(|q| q.amount.is_zero()) {
            return Err(NetworkError::ReturnAmountTooLow);
        }
        let target_amount = quotes.last().map_or(U256::zero(), |q| q.amount);
        if target_amount < params.min_return_amount {
            return Err(NetworkError::ReturnAmountTooLow);
        }
        self.ensure_pullable(params.source_token, caller, params.source_amount, permit)?;

        let context_id = ContextIdBuilder::new("trade", caller, now)
            .token(params.source_token)
            .token(params.target_token)
            .amount(params.source_amount)
            .amount(params.min_return_amount)
            .number(params.deadline)
            .address(beneficiary)
            .build();

        let vault = self.vault.address();
        self.pull(params.source_token, caller, vault, params.source_amount, permit)?;

        let mut amount = params.source_amount;
        let last = hops.len() - 1;
        for (position, hop) in hops.iter().enumerate() {
            let min_return = if position == last {
                params.min_return_amount
            } else {
                U256::one()
            };
            amount = self.trade_hop(context_id, caller, *hop, amount, min_return)?;
        }

        self.vault
            .withdraw_tokens(&mut self.ledger, params.target_token, beneficiary, amount)?;

        info!(
            context_id = %context_id,
            trader = %caller,
            source = %params.source_token,
            target = %params.target_token,
            source_amount = %params.source_amount,
            target_amount = %amount,
            hops = hops.len(),
            "Trade executed"
        );
        Ok(amount)
    }

    fn trade_hop(
        &mut self,
        context_id: ContextId,
        trader: Address,
        hop: Hop,
        source_amount: U256,
        min_return_amount: U256,
    ) -> NetworkResult<U256> {
        let network = self.config.address;
        let network_token = self.config.network_token;
        let result = self.collections[hop.index].trade(
            network,
            hop.source_token,
            hop.target_token,
            source_amount,
            min_return_amount,
        )?;

        // Fees taken in network tokens accrue to the network token pool.
        let (fee_pool, staked_balance) = if hop.target_token == network_token {
            self.network_token_pool.on_fees_collected(
                network,
                hop.pool,
                result.fee_amount,
                FeeType::Trading,
            )?;
            (network_token, self.network_token_pool.staked_balance())
        } else {
            let staked = self.collections[hop.index]
                .pool_data(hop.pool)
                .map_or(U256::zero(), |data| data.liquidity.staked_balance);
            (hop.pool, staked)
        };

        self.events.record(NetworkEvent::TokensTraded {
            context_id,
            pool: hop.pool,
            source_token: hop.source_token,
            target_token: hop.target_token,
            source_amount,
            target_amount: result.amount,
            trader,
        });
        self.events.record(NetworkEvent::FeesCollected {
            context_id,
            pool: fee_pool,
            fee_type: FeeType::Trading,
            amount: result.fee_amount,
            staked_balance,
        });
        self.record_trading_liquidity(context_id, hop.pool, hop.index);

        debug!(context_id = %context_id, pool = %hop.pool, source_amount = %source_amount, target_amount = %result.amount, fee = %result.fee_amount, "Trade hop executed");
        Ok(result.amount)
    }
}
