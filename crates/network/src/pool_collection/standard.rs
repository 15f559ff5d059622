use super::PoolCollection;
use crate::access::{Owned, Versioned};
use crate::config::PoolCollectionConfig;
use crate::ledger::TokenLedger;
use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::events::{EventLog, PoolCollectionEvent};
use amm_network_domain::fees::{amount_before_fee, ensure_valid_fee, fee_amount};
use amm_network_domain::math::{
    add, mul_div_f, source_amount, target_amount, trading_liquidity_product,
};
use amm_network_domain::pool::{
    DepositAmounts, Pool, PoolLiquidity, TradeAmountsAndFee, WithdrawalAmounts,
    WithdrawalBalances,
};
use amm_network_domain::token::{Address, Token, TokenMetadata, derive_address};
use amm_network_domain::value_objects::{Fraction, SignedAmount};
use primitive_types::U256;
use std::cmp::min;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Prefix of pool token symbols.
pub const POOL_TOKEN_SYMBOL_PREFIX: &str = "lp";

const DEFAULT_POOL_TOKEN_DECIMALS: u8 = 18;

/// Constant product pool collection.
#[derive(Debug, Clone)]
pub struct StandardPoolCollection {
    config: PoolCollectionConfig,
    owned: Owned,
    network: Address,
    network_token: Token,
    default_trading_fee_ppm: u32,
    pools: BTreeMap<Token, Pool>,
    symbol_overrides: HashMap<Token, String>,
    events: EventLog<PoolCollectionEvent>,
}

impl StandardPoolCollection {
    /// Creates a collection serving the router at `network`. Fails with
    /// `InvalidFee` when the configured default fee exceeds `PPM_RESOLUTION`.
    pub fn new(
        config: PoolCollectionConfig,
        network: Address,
        network_token: Token,
    ) -> NetworkResult<Self> {
        ensure_valid_fee(config.default_trading_fee_ppm)?;
        Ok(Self {
            owned: Owned::new(config.owner),
            default_trading_fee_ppm: config.default_trading_fee_ppm,
            config,
            network,
            network_token,
            pools: BTreeMap::new(),
            symbol_overrides: HashMap::new(),
            events: EventLog::new(),
        })
    }

    fn ensure_network(&self, caller: Address) -> NetworkResult<()> {
        if caller == self.network {
            Ok(())
        } else {
            Err(NetworkError::AccessDenied)
        }
    }

    fn pool(&self, pool: Token) -> NetworkResult<&Pool> {
        self.pools.get(&pool).ok_or(NetworkError::PoolDoesNotExist)
    }

    fn pool_mut(&mut self, pool: Token) -> NetworkResult<&mut Pool> {
        self.pools.get_mut(&pool).ok_or(NetworkError::PoolDoesNotExist)
    }

    /// Resolves the pool of a hop and whether the network token is the target.
    fn trade_pool(&self, source: Token, target: Token) -> NetworkResult<(Token, bool)> {
        if source == self.network_token && target != self.network_token {
            Ok((target, false))
        } else if target == self.network_token && source != self.network_token {
            Ok((source, true))
        } else {
            Err(NetworkError::InvalidPool)
        }
    }

    fn trade_balances(liquidity: &PoolLiquidity, target_is_network: bool) -> (U256, U256) {
        if target_is_network {
            (
                liquidity.base_token_trading_liquidity,
                liquidity.network_token_trading_liquidity,
            )
        } else {
            (
                liquidity.network_token_trading_liquidity,
                liquidity.base_token_trading_liquidity,
            )
        }
    }

    /// Trading liquidity a deposit adds, as (base, network). Both are zero or
    /// both are positive.
    fn trading_liquidity_deltas(
        pool: &Pool,
        base_token_amount: U256,
        unallocated: U256,
    ) -> NetworkResult<(U256, U256)> {
        let liquidity = &pool.liquidity;
        let (n, d) = if liquidity.trading_liquidity_product.is_zero() {
            if !pool.initial_rate.is_valid() {
                return Err(NetworkError::NoInitialRate);
            }
            (pool.initial_rate.n, pool.initial_rate.d)
        } else {
            (
                liquidity.network_token_trading_liquidity,
                liquidity.base_token_trading_liquidity,
            )
        };

        let mut base_delta = base_token_amount;
        let mut network_delta = mul_div_f(base_token_amount, n, d)?;
        if network_delta > unallocated {
            network_delta = unallocated;
            base_delta = mul_div_f(unallocated, d, n)?;
        }
        if base_delta.is_zero() || network_delta.is_zero() {
            return Ok((U256::zero(), U256::zero()));
        }
        Ok((base_delta, network_delta))
    }

    fn calc_deposit(
        &self,
        ledger: &TokenLedger,
        pool_key: Token,
        base_token_amount: U256,
        unallocated: U256,
    ) -> NetworkResult<(DepositAmounts, PoolLiquidity)> {
        let pool = self.pool(pool_key)?;
        if base_token_amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }

        let liquidity = pool.liquidity;
        let staked_balance = add(liquidity.staked_balance, base_token_amount)?;
        if staked_balance > pool.deposit_limit {
            return Err(NetworkError::DepositLimitExceeded);
        }

        let supply = ledger.total_supply(pool.pool_token);
        let pool_token_amount = if supply.is_zero() || liquidity.staked_balance.is_zero() {
            base_token_amount
        } else {
            mul_div_f(base_token_amount, supply, liquidity.staked_balance)?
        };

        let (base_delta, network_delta) = if pool.deposits_enabled && !unallocated.is_zero() {
            Self::trading_liquidity_deltas(pool, base_token_amount, unallocated)?
        } else {
            (U256::zero(), U256::zero())
        };

        let base_liquidity = add(liquidity.base_token_trading_liquidity, base_delta)?;
        let network_liquidity = add(liquidity.network_token_trading_liquidity, network_delta)?;
        let updated = PoolLiquidity {
            base_token_trading_liquidity: base_liquidity,
            network_token_trading_liquidity: network_liquidity,
            trading_liquidity_product: trading_liquidity_product(base_liquidity, network_liquidity)?,
            staked_balance,
        };

        Ok((
            DepositAmounts {
                pool_token_amount,
                base_token_delta_amount: base_delta,
                network_token_delta_amount: network_delta,
            },
            updated,
        ))
    }

    /// Network tokens owed for a base-token shortfall no custody could cover.
    fn shortfall_compensation(pool_key: Token, pool: &Pool, shortfall: U256) -> NetworkResult<U256> {
        let liquidity = &pool.liquidity;
        if liquidity.is_trading_enabled() {
            mul_div_f(
                shortfall,
                liquidity.network_token_trading_liquidity,
                liquidity.base_token_trading_liquidity,
            )
        } else if pool.initial_rate.is_valid() {
            mul_div_f(shortfall, pool.initial_rate.n, pool.initial_rate.d)
        } else {
            warn!(pool = %pool_key, shortfall = %shortfall, "Withdrawal shortfall cannot be priced");
            Ok(U256::zero())
        }
    }

    fn calc_withdrawal(
        &self,
        ledger: &TokenLedger,
        pool_key: Token,
        pool_token_amount: U256,
        balances: WithdrawalBalances,
        withdrawal_fee_ppm: u32,
    ) -> NetworkResult<(WithdrawalAmounts, PoolLiquidity)> {
        let pool = self.pool(pool_key)?;
        if pool_token_amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        let supply = ledger.total_supply(pool.pool_token);
        if pool_token_amount > supply {
            return Err(NetworkError::InsufficientBalance);
        }

        let liquidity = pool.liquidity;
        let base = liquidity.base_token_trading_liquidity;
        let network = liquidity.network_token_trading_liquidity;
        let staked = liquidity.staked_balance;

        let claim = mul_div_f(pool_token_amount, staked, supply)?;
        let fee = fee_amount(claim, withdrawal_fee_ppm)?;
        let net = claim - fee;

        // The vault pays first; whatever it pays beyond its excess comes out
        // of trading liquidity.
        let vault_excess = balances.vault.saturating_sub(base);
        let from_vault = min(net, balances.vault);
        let base_delta = min(from_vault.saturating_sub(vault_excess), base);
        let new_base = base - base_delta;

        let mut shortfall = net - from_vault;
        let from_wallet = min(shortfall, balances.external_protection_wallet);
        shortfall -= from_wallet;
        let network_for_provider = if shortfall.is_zero() {
            U256::zero()
        } else {
            Self::shortfall_compensation(pool_key, pool, shortfall)?
        };

        let renounce = if staked.is_zero() {
            U256::zero()
        } else {
            min(network, mul_div_f(network, claim, staked)?)
        };
        // Keep the pool rate: network side follows the base side.
        let new_network = if base.is_zero() {
            network
        } else {
            mul_div_f(network, new_base, base)?
        };
        let arbitrage = SignedAmount::difference(new_network, network - renounce);

        let updated = PoolLiquidity {
            base_token_trading_liquidity: new_base,
            network_token_trading_liquidity: new_network,
            trading_liquidity_product: trading_liquidity_product(new_base, new_network)?,
            staked_balance: staked - net,
        };

        Ok((
            WithdrawalAmounts {
                base_token_amount_from_vault: from_vault,
                base_token_amount_from_external_protection_wallet: from_wallet,
                network_token_amount_to_mint_for_provider: network_for_provider,
                base_token_trading_liquidity_delta: base_delta,
                network_token_trading_liquidity_delta: network - new_network,
                network_token_amount_to_renounce: renounce,
                network_token_arbitrage_amount: arbitrage,
                base_token_withdrawal_fee_amount: fee,
            },
            updated,
        ))
    }
}

impl Versioned for StandardPoolCollection {
    fn version(&self) -> u16 {
        self.config.version
    }
}

impl PoolCollection for StandardPoolCollection {
    fn address(&self) -> Address {
        self.config.address
    }

    fn pool_type(&self) -> u16 {
        self.config.pool_type
    }

    fn owner(&self) -> Address {
        self.owned.owner()
    }

    fn default_trading_fee_ppm(&self) -> u32 {
        self.default_trading_fee_ppm
    }

    fn pool_count(&self) -> usize {
        self.pools.len()
    }

    fn pools(&self) -> Vec<Token> {
        self.pools.keys().copied().collect()
    }

    fn is_pool_valid(&self, pool: Token) -> bool {
        self.pools
            .get(&pool)
            .is_some_and(|p| !p.pool_token.is_zero())
    }

    fn pool_data(&self, pool: Token) -> Option<Pool> {
        self.pools.get(&pool).cloned()
    }

    fn pool_by_pool_token(&self, pool_token: Token) -> Option<Token> {
        self.pools
            .iter()
            .find(|(_, p)| p.pool_token == pool_token)
            .map(|(token, _)| *token)
    }

    fn token_symbol_override(&self, token: Token) -> Option<String> {
        self.symbol_overrides.get(&token).cloned()
    }

    fn events(&self) -> &[PoolCollectionEvent] {
        self.events.events()
    }

    fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> NetworkResult<()> {
        self.owned.transfer_ownership(caller, new_owner)
    }

    fn accept_ownership(&mut self, caller: Address) -> NetworkResult<()> {
        self.owned.accept_ownership(caller)
    }

    fn create_pool(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        token: Token,
    ) -> NetworkResult<()> {
        self.ensure_network(caller)?;
        if token.is_zero() {
            return Err(NetworkError::InvalidAddress);
        }
        if self.is_pool_valid(token) {
            return Err(NetworkError::PoolAlreadyExists);
        }

        let symbol = self
            .symbol_overrides
            .get(&token)
            .cloned()
            .unwrap_or_else(|| ledger.symbol(token));
        let decimals = ledger
            .metadata(token)
            .map_or(DEFAULT_POOL_TOKEN_DECIMALS, |m| m.decimals);
        let pool_token = Token::new(derive_address(&[
            b"pool-token",
            self.config.address.as_bytes(),
            token.address().as_bytes(),
        ]));
        ledger.register_token(
            pool_token,
            TokenMetadata::new(
                format!("{POOL_TOKEN_SYMBOL_PREFIX}{symbol}"),
                format!("{symbol} Liquidity Pool Token"),
                decimals,
            ),
        );

        self.pools.insert(
            token,
            Pool::new(
                pool_token,
                self.default_trading_fee_ppm,
                self.config.default_deposit_limit,
            ),
        );
        self.events
            .record(PoolCollectionEvent::PoolCreated { pool_token, token });
        info!(pool = %token, pool_token = %pool_token, symbol = %symbol, "Pool created");
        Ok(())
    }

    fn set_default_trading_fee_ppm(
        &mut self,
        caller: Address,
        fee_ppm: u32,
    ) -> NetworkResult<()> {
        self.owned.ensure_owner(caller)?;
        ensure_valid_fee(fee_ppm)?;
        let prev = self.default_trading_fee_ppm;
        if prev == fee_ppm {
            return Ok(());
        }
        self.default_trading_fee_ppm = fee_ppm;
        self.events
            .record(PoolCollectionEvent::DefaultTradingFeePpmUpdated {
                prev_fee_ppm: prev,
                new_fee_ppm: fee_ppm,
            });
        info!(prev, new = fee_ppm, "Default trading fee updated");
        Ok(())
    }

    fn set_trading_fee_ppm(
        &mut self,
        caller: Address,
        pool: Token,
        fee_ppm: u32,
    ) -> NetworkResult<()> {
        self.owned.ensure_owner(caller)?;
        ensure_valid_fee(fee_ppm)?;
        let data = self.pool_mut(pool)?;
        let prev = data.trading_fee_ppm;
        if prev == fee_ppm {
            return Ok(());
        }
        data.trading_fee_ppm = fee_ppm;
        self.events.record(PoolCollectionEvent::TradingFeePpmUpdated {
            pool,
            prev_fee_ppm: prev,
            new_fee_ppm: fee_ppm,
        });
        info!(pool = %pool, prev, new = fee_ppm, "Trading fee updated");
        Ok(())
    }

    fn set_initial_rate(
        &mut self,
        caller: Address,
        pool: Token,
        rate: Fraction,
    ) -> NetworkResult<()> {
        self.owned.ensure_owner(caller)?;
        if !rate.is_valid() {
            return Err(NetworkError::InvalidRate);
        }
        let data = self.pool_mut(pool)?;
        let prev = data.initial_rate;
        if prev == rate {
            return Ok(());
        }
        data.initial_rate = rate;
        self.events.record(PoolCollectionEvent::InitialRateUpdated {
            pool,
            prev_rate: prev,
            new_rate: rate,
        });
        info!(pool = %pool, rate = %rate, "Initial rate updated");
        Ok(())
    }

    fn set_deposit_limit(
        &mut self,
        caller: Address,
        pool: Token,
        limit: U256,
    ) -> NetworkResult<()> {
        self.owned.ensure_owner(caller)?;
        let data = self.pool_mut(pool)?;
        let prev = data.deposit_limit;
        if prev == limit {
            return Ok(());
        }
        data.deposit_limit = limit;
        self.events.record(PoolCollectionEvent::DepositLimitUpdated {
            pool,
            prev_deposit_limit: prev,
            new_deposit_limit: limit,
        });
        info!(pool = %pool, limit = %limit, "Deposit limit updated");
        Ok(())
    }

    fn enable_deposits(&mut self, caller: Address, pool: Token, status: bool) -> NetworkResult<()> {
        self.owned.ensure_owner(caller)?;
        let data = self.pool_mut(pool)?;
        let prev = data.deposits_enabled;
        if prev == status {
            return Ok(());
        }
        data.deposits_enabled = status;
        self.events.record(PoolCollectionEvent::DepositsEnabledUpdated {
            pool,
            prev_status: prev,
            new_status: status,
        });
        info!(pool = %pool, status, "Deposits status updated");
        Ok(())
    }

    fn set_token_symbol_override(
        &mut self,
        caller: Address,
        token: Token,
        symbol: &str,
    ) -> NetworkResult<()> {
        self.owned.ensure_owner(caller)?;
        if symbol.is_empty() {
            self.symbol_overrides.remove(&token);
        } else {
            self.symbol_overrides.insert(token, symbol.to_string());
        }
        Ok(())
    }

    fn deposit_amounts(
        &self,
        ledger: &TokenLedger,
        pool: Token,
        base_token_amount: U256,
        unallocated_network_liquidity: U256,
    ) -> NetworkResult<DepositAmounts> {
        self.calc_deposit(ledger, pool, base_token_amount, unallocated_network_liquidity)
            .map(|(amounts, _)| amounts)
    }

    fn deposit_for(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        provider: Address,
        pool: Token,
        base_token_amount: U256,
        unallocated_network_liquidity: U256,
    ) -> NetworkResult<DepositAmounts> {
        self.ensure_network(caller)?;
        let (amounts, updated) =
            self.calc_deposit(ledger, pool, base_token_amount, unallocated_network_liquidity)?;
        let data = self.pool_mut(pool)?;
        ledger.mint(data.pool_token, provider, amounts.pool_token_amount)?;
        data.liquidity = updated;
        debug!(
            pool = %pool,
            provider = %provider,
            pool_token_amount = %amounts.pool_token_amount,
            base_delta = %amounts.base_token_delta_amount,
            network_delta = %amounts.network_token_delta_amount,
            "Deposit applied"
        );
        Ok(amounts)
    }

    fn withdrawal_amounts(
        &self,
        ledger: &TokenLedger,
        pool: Token,
        pool_token_amount: U256,
        balances: WithdrawalBalances,
        withdrawal_fee_ppm: u32,
    ) -> NetworkResult<WithdrawalAmounts> {
        self.calc_withdrawal(ledger, pool, pool_token_amount, balances, withdrawal_fee_ppm)
            .map(|(amounts, _)| amounts)
    }

    fn withdraw(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        pool: Token,
        pool_token_amount: U256,
        balances: WithdrawalBalances,
        withdrawal_fee_ppm: u32,
    ) -> NetworkResult<WithdrawalAmounts> {
        self.ensure_network(caller)?;
        let (amounts, updated) =
            self.calc_withdrawal(ledger, pool, pool_token_amount, balances, withdrawal_fee_ppm)?;
        let holder = self.config.address;
        let data = self.pool_mut(pool)?;
        ledger.burn(data.pool_token, holder, pool_token_amount)?;
        data.liquidity = updated;
        debug!(
            pool = %pool,
            pool_token_amount = %pool_token_amount,
            from_vault = %amounts.base_token_amount_from_vault,
            renounce = %amounts.network_token_amount_to_renounce,
            arbitrage = %amounts.network_token_arbitrage_amount,
            "Withdrawal applied"
        );
        Ok(amounts)
    }

    fn target_amount_and_fee(
        &self,
        source_token: Token,
        target_token: Token,
        source_amount: U256,
    ) -> NetworkResult<TradeAmountsAndFee> {
        let (pool_key, target_is_network) = self.trade_pool(source_token, target_token)?;
        let pool = self.pool(pool_key)?;
        if source_amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        if !pool.liquidity.is_trading_enabled() {
            return Err(NetworkError::InsufficientLiquidity);
        }
        let (source_balance, target_balance) =
            Self::trade_balances(&pool.liquidity, target_is_network);
        let gross = target_amount(source_balance, target_balance, source_amount)?;
        let fee = fee_amount(gross, pool.trading_fee_ppm)?;
        Ok(TradeAmountsAndFee {
            amount: gross - fee,
            fee_amount: fee,
        })
    }

    fn source_amount_and_fee(
        &self,
        source_token: Token,
        target_token: Token,
        target_amount: U256,
    ) -> NetworkResult<TradeAmountsAndFee> {
        let (pool_key, target_is_network) = self.trade_pool(source_token, target_token)?;
        let pool = self.pool(pool_key)?;
        if target_amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        if !pool.liquidity.is_trading_enabled() {
            return Err(NetworkError::InsufficientLiquidity);
        }
        let (source_balance, target_balance) =
            Self::trade_balances(&pool.liquidity, target_is_network);
        let gross = amount_before_fee(target_amount, pool.trading_fee_ppm)?;
        let amount = source_amount(source_balance, target_balance, gross)?;
        Ok(TradeAmountsAndFee {
            amount,
            fee_amount: gross - target_amount,
        })
    }

    fn trade(
        &mut self,
        caller: Address,
        source_token: Token,
        target_token: Token,
        source_amount: U256,
        min_return_amount: U256,
    ) -> NetworkResult<TradeAmountsAndFee> {
        self.ensure_network(caller)?;
        let (pool_key, target_is_network) = self.trade_pool(source_token, target_token)?;
        let amounts = self.target_amount_and_fee(source_token, target_token, source_amount)?;
        if amounts.amount < min_return_amount {
            return Err(NetworkError::ReturnAmountTooLow);
        }

        let data = self.pool_mut(pool_key)?;
        let mut liquidity = data.liquidity;
        if target_is_network {
            // The fee leaves trading liquidity; the router credits it to the
            // network token pool.
            liquidity.base_token_trading_liquidity =
                add(liquidity.base_token_trading_liquidity, source_amount)?;
            liquidity.network_token_trading_liquidity -= amounts.amount + amounts.fee_amount;
        } else {
            liquidity.network_token_trading_liquidity =
                add(liquidity.network_token_trading_liquidity, source_amount)?;
            liquidity.base_token_trading_liquidity -= amounts.amount;
            liquidity.staked_balance = add(liquidity.staked_balance, amounts.fee_amount)?;
        }
        liquidity.trading_liquidity_product = trading_liquidity_product(
            liquidity.base_token_trading_liquidity,
            liquidity.network_token_trading_liquidity,
        )?;
        data.liquidity = liquidity;

        debug!(
            pool = %pool_key,
            source_amount = %source_amount,
            target_amount = %amounts.amount,
            fee = %amounts.fee_amount,
            "Trade applied"
        );
        Ok(amounts)
    }
}
