use super::Network;
use crate::ledger::PermitSignature;
use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::events::NetworkEvent;
use amm_network_domain::token::{Address, Token};
use amm_network_domain::value_objects::{ContextId, ContextIdBuilder};
use primitive_types::U256;
use tracing::{debug, info};

impl Network {
    /// Deposits `amount` of `pool` tokens for the caller and returns the pool
    /// tokens minted.
    pub fn deposit(
        &mut self,
        caller: Address,
        pool: Token,
        amount: U256,
        value: U256,
    ) -> NetworkResult<U256> {
        self.deposit_for(caller, caller, pool, amount, value)
    }

    /// Deposits the caller's tokens on behalf of `provider`, who receives the
    /// pool tokens.
    pub fn deposit_for(
        &mut self,
        caller: Address,
        provider: Address,
        pool: Token,
        amount: U256,
        value: U256,
    ) -> NetworkResult<U256> {
        let _lock = self.guard.enter()?;
        self.deposit_inner(caller, provider, pool, amount, value, None)
    }

    /// Like [`Network::deposit_for`], with the allowance granted by a signed
    /// permit. Not available for the native token.
    pub fn deposit_for_permitted(
        &mut self,
        caller: Address,
        provider: Address,
        pool: Token,
        amount: U256,
        signature: &PermitSignature,
    ) -> NetworkResult<U256> {
        let _lock = self.guard.enter()?;
        if pool.is_native() {
            return Err(NetworkError::PermitUnsupported);
        }
        self.deposit_inner(caller, provider, pool, amount, U256::zero(), Some(signature))
    }

    fn deposit_inner(
        &mut self,
        caller: Address,
        provider: Address,
        pool: Token,
        amount: U256,
        value: U256,
        permit: Option<&PermitSignature>,
    ) -> NetworkResult<U256> {
        if provider.is_zero() {
            return Err(NetworkError::InvalidAddress);
        }
        if amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        let context_id = ContextIdBuilder::new("deposit", caller, self.clock.now())
            .address(provider)
            .token(pool)
            .amount(amount)
            .build();

        if pool == self.config.network_token {
            self.deposit_network_token(context_id, caller, provider, amount, value, permit)
        } else {
            self.deposit_base_token(context_id, caller, provider, pool, amount, value, permit)
        }
    }

    fn deposit_network_token(
        &mut self,
        context_id: ContextId,
        caller: Address,
        provider: Address,
        amount: U256,
        value: U256,
        permit: Option<&PermitSignature>,
    ) -> NetworkResult<U256> {
        let network_token = self.config.network_token;
        Self::ensure_value(network_token, amount, value)?;
        self.ensure_pullable(network_token, caller, amount, permit)?;
        self.network_token_pool
            .deposit_amounts(&self.ledger, amount)?;

        let pool_address = self.network_token_pool.address();
        self.pull(network_token, caller, pool_address, amount, permit)?;
        let network = self.config.address;
        let amounts = self
            .network_token_pool
            .deposit_for(network, &mut self.ledger, provider, amount)?;

        self.events.record(NetworkEvent::NetworkTokenDeposited {
            context_id,
            provider,
            deposit_amount: amount,
            pool_token_amount: amounts.pool_token_amount,
            gov_token_amount: amounts.gov_token_amount,
        });
        self.record_network_totals(context_id);

        info!(context_id = %context_id, provider = %provider, amount = %amount, pool_token_amount = %amounts.pool_token_amount, "Network tokens deposited");
        Ok(amounts.pool_token_amount)
    }

    #[allow(clippy::too_many_arguments)]
    fn deposit_base_token(
        &mut self,
        context_id: ContextId,
        caller: Address,
        provider: Address,
        pool: Token,
        amount: U256,
        value: U256,
        permit: Option<&PermitSignature>,
    ) -> NetworkResult<U256> {
        let index = self.collection_for_pool(pool)?;
        let unallocated = self
            .network_token_pool
            .unallocated_liquidity(self.settings.as_ref(), pool);
        if unallocated.is_zero() {
            if !self.settings.is_token_whitelisted(pool) {
                return Err(NetworkError::PoolNotWhitelisted);
            }
        } else if !self.is_network_liquidity_enabled(pool, index) {
            return Err(NetworkError::NetworkLiquidityDisabled);
        }
        Self::ensure_value(pool, amount, value)?;
        self.ensure_pullable(pool, caller, amount, permit)?;
        self.collections[index].deposit_amounts(&self.ledger, pool, amount, unallocated)?;

        let vault = self.vault.address();
        self.pull(pool, caller, vault, amount, permit)?;

        let network = self.config.address;
        let amounts = self.collections[index].deposit_for(
            network,
            &mut self.ledger,
            provider,
            pool,
            amount,
            unallocated,
        )?;
        if !amounts.network_token_delta_amount.is_zero() {
            self.network_token_pool.request_liquidity(
                network,
                &mut self.ledger,
                self.settings.as_ref(),
                context_id,
                pool,
                amounts.network_token_delta_amount,
            )?;
            debug!(context_id = %context_id, pool = %pool, base_delta = %amounts.base_token_delta_amount, network_delta = %amounts.network_token_delta_amount, "Trading liquidity increased");
        }

        let pool_collection = self.collections[index].address();
        self.events.record(NetworkEvent::BaseTokenDeposited {
            context_id,
            token: pool,
            provider,
            pool_collection,
            deposit_amount: amount,
            pool_token_amount: amounts.pool_token_amount,
        });
        self.record_pool_totals(context_id, pool, index);
        self.record_network_totals(context_id);
        self.record_trading_liquidity(context_id, pool, index);

        info!(context_id = %context_id, pool = %pool, provider = %provider, amount = %amount, pool_token_amount = %amounts.pool_token_amount, "Base tokens deposited");
        Ok(amounts.pool_token_amount)
    }
}
