use super::Network;
use crate::collaborators::WithdrawalRequest;
use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::events::NetworkEvent;
use amm_network_domain::pool::WithdrawalBalances;
use amm_network_domain::token::{Address, Token};
use amm_network_domain::value_objects::{ContextId, ContextIdBuilder};
use primitive_types::U256;
use tracing::{debug, info};

impl Network {
    /// Locks `amount` pool tokens of the caller for withdrawal and returns
    /// the request id.
    pub fn init_withdrawal(
        &mut self,
        caller: Address,
        pool_token: Token,
        amount: U256,
    ) -> NetworkResult<u64> {
        let _lock = self.guard.enter()?;
        if pool_token != self.network_token_pool.pool_token()
            && self.pool_by_pool_token(pool_token).is_none()
        {
            return Err(NetworkError::InvalidPool);
        }
        let now = self.clock.now();
        self.pending_withdrawals
            .init_withdrawal(&mut self.ledger, caller, pool_token, amount, now)
    }

    /// Cancels a pending request and returns the unlocked pool tokens.
    pub fn cancel_withdrawal(&mut self, caller: Address, id: u64) -> NetworkResult<U256> {
        let _lock = self.guard.enter()?;
        self.pending_withdrawals
            .cancel_withdrawal(&mut self.ledger, caller, id)
    }

    /// Completes an unlocked withdrawal request and pays the provider.
    ///
    /// Returns the network tokens paid for network-token requests and the
    /// base tokens paid out of custody for base-token requests.
    pub fn withdraw(&mut self, caller: Address, id: u64) -> NetworkResult<U256> {
        let _lock = self.guard.enter()?;
        let request = self
            .pending_withdrawals
            .withdrawal_request(id)
            .ok_or(NetworkError::UnknownWithdrawalRequest(id))?;
        if request.provider != caller {
            return Err(NetworkError::AccessDenied);
        }
        let now = self.clock.now();
        let unlocks_at = request
            .created_at
            .saturating_add(self.pending_withdrawals.lock_duration());
        if now < unlocks_at {
            return Err(NetworkError::WithdrawalLocked(id));
        }
        let context_id = ContextIdBuilder::new("withdraw", caller, now)
            .number(id)
            .token(request.pool_token)
            .amount(request.pool_token_amount)
            .build();

        if request.pool_token == self.network_token_pool.pool_token() {
            self.withdraw_network_token(context_id, id, request, now)
        } else {
            self.withdraw_base_token(context_id, id, request, now)
        }
    }

    fn withdraw_network_token(
        &mut self,
        context_id: ContextId,
        id: u64,
        request: WithdrawalRequest,
        now: u64,
    ) -> NetworkResult<U256> {
        let provider = request.provider;
        let network = self.config.address;
        let pool_address = self.network_token_pool.address();
        let gov_token = self.network_token_pool.gov_token();
        let fee_ppm = self.settings.withdrawal_fee_ppm();

        let quote = self.network_token_pool.withdrawal_amounts(
            &self.ledger,
            request.pool_token_amount,
            fee_ppm,
        )?;
        self.ledger
            .ensure_transferable(gov_token, network, provider, quote.gov_token_amount)?;

        let completed = self.pending_withdrawals.complete_withdrawal(
            &mut self.ledger,
            context_id,
            provider,
            id,
            now,
            pool_address,
        )?;
        self.ledger.transfer_from(
            gov_token,
            network,
            provider,
            pool_address,
            quote.gov_token_amount,
        )?;
        let amounts = self.network_token_pool.withdraw(
            network,
            &mut self.ledger,
            provider,
            completed.pool_token_amount,
            fee_ppm,
        )?;
        assert_eq!(
            amounts.pool_token_amount, completed.pool_token_amount,
            "withdrawn pool tokens differ from the completed request"
        );

        self.events.record(NetworkEvent::NetworkTokenWithdrawn {
            context_id,
            provider,
            network_token_amount: amounts.network_token_amount,
            pool_token_amount: amounts.pool_token_amount,
            gov_token_amount: amounts.gov_token_amount,
            withdrawal_fee_amount: amounts.withdrawal_fee_amount,
        });
        self.record_network_totals(context_id);

        info!(context_id = %context_id, provider = %provider, id, amount = %amounts.network_token_amount, "Network tokens withdrawn");
        Ok(amounts.network_token_amount)
    }

    fn withdraw_base_token(
        &mut self,
        context_id: ContextId,
        id: u64,
        request: WithdrawalRequest,
        now: u64,
    ) -> NetworkResult<U256> {
        let provider = request.provider;
        let network = self.config.address;
        let (index, pool) = self
            .pool_by_pool_token(request.pool_token)
            .ok_or(NetworkError::InvalidPool)?;
        if !self.is_network_liquidity_enabled(pool, index) {
            return Err(NetworkError::NetworkLiquidityDisabled);
        }

        let balances = WithdrawalBalances {
            vault: self.vault.balance_of(&self.ledger, pool),
            external_protection_wallet: self
                .external_protection_wallet
                .as_ref()
                .map_or(U256::zero(), |wallet| wallet.balance_of(&self.ledger, pool)),
        };
        let fee_ppm = self.settings.withdrawal_fee_ppm();
        self.collections[index].withdrawal_amounts(
            &self.ledger,
            pool,
            request.pool_token_amount,
            balances,
            fee_ppm,
        )?;

        let pool_collection = self.collections[index].address();
        let completed = self.pending_withdrawals.complete_withdrawal(
            &mut self.ledger,
            context_id,
            provider,
            id,
            now,
            pool_collection,
        )?;
        let amounts = self.collections[index].withdraw(
            network,
            &mut self.ledger,
            pool,
            completed.pool_token_amount,
            balances,
            fee_ppm,
        )?;

        if !amounts.network_token_amount_to_renounce.is_zero() {
            self.network_token_pool.renounce_liquidity(
                network,
                &mut self.ledger,
                context_id,
                pool,
                amounts.network_token_amount_to_renounce,
            )?;
        }
        let arbitrage = amounts.network_token_arbitrage_amount;
        if arbitrage.is_positive() {
            let vault = self.vault.address();
            self.network_token_pool
                .mint(network, &mut self.ledger, vault, arbitrage.magnitude)?;
        } else if arbitrage.is_negative() {
            self.network_token_pool
                .burn_from_vault(network, &mut self.ledger, arbitrage.magnitude)?;
        }
        if !amounts.network_token_amount_to_mint_for_provider.is_zero() {
            self.network_token_pool.mint(
                network,
                &mut self.ledger,
                provider,
                amounts.network_token_amount_to_mint_for_provider,
            )?;
        }
        debug!(context_id = %context_id, pool = %pool, renounce = %amounts.network_token_amount_to_renounce, arbitrage = %arbitrage, "Network liquidity rebalanced");

        if !amounts.base_token_amount_from_vault.is_zero() {
            self.vault.withdraw_tokens(
                &mut self.ledger,
                pool,
                provider,
                amounts.base_token_amount_from_vault,
            )?;
        }
        if !amounts
            .base_token_amount_from_external_protection_wallet
            .is_zero()
        {
            if let Some(wallet) = self.external_protection_wallet.as_mut() {
                wallet.withdraw_tokens(
                    &mut self.ledger,
                    pool,
                    provider,
                    amounts.base_token_amount_from_external_protection_wallet,
                )?;
            }
        }

        self.events.record(NetworkEvent::BaseTokenWithdrawn {
            context_id,
            token: pool,
            provider,
            pool_collection,
            base_token_amount: amounts.base_token_amount_from_vault,
            pool_token_amount: completed.pool_token_amount,
            external_protection_base_token_amount: amounts
                .base_token_amount_from_external_protection_wallet,
            network_token_amount: amounts.network_token_amount_to_mint_for_provider,
            withdrawal_fee_amount: amounts.base_token_withdrawal_fee_amount,
        });
        self.record_pool_totals(context_id, pool, index);
        self.record_network_totals(context_id);
        self.record_trading_liquidity(context_id, pool, index);

        info!(context_id = %context_id, pool = %pool, provider = %provider, id, amount = %amounts.base_token_amount_paid(), "Base tokens withdrawn");
        Ok(amounts.base_token_amount_paid())
    }
}
