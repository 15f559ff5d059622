//! Network token pool.
//!
//! Holds the network-token side of the network: the liquidity lent to base
//! pools, the staked balance of network-token providers and the pool and
//! governance tokens issued against it. Every mutating operation is reserved
//! for the router.

use crate::access::Versioned;
use crate::collaborators::NetworkSettings;
use crate::config::NetworkConfig;
use crate::ledger::TokenLedger;
use amm_network_domain::enums::FeeType;
use amm_network_domain::error::{NetworkError, NetworkResult};
use amm_network_domain::fees::fee_amount;
use amm_network_domain::math::{add, mul_div_f};
use amm_network_domain::pool::{NetworkTokenDepositAmounts, NetworkTokenWithdrawalAmounts};
use amm_network_domain::token::{Address, Token};
use amm_network_domain::value_objects::ContextId;
use primitive_types::U256;
use std::cmp::min;
use std::collections::HashMap;
use tracing::{debug, info};

const VERSION: u16 = 1;

/// Network-token liquidity shared by every base pool.
#[derive(Debug, Clone)]
pub struct NetworkTokenPool {
    address: Address,
    network: Address,
    vault: Address,
    network_token: Token,
    gov_token: Token,
    pool_token: Token,
    staked_balance: U256,
    allocations: HashMap<Token, U256>,
}

impl NetworkTokenPool {
    #[must_use]
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            address: config.network_token_pool,
            network: config.address,
            vault: config.vault,
            network_token: config.network_token,
            gov_token: config.gov_token,
            pool_token: config.network_pool_token,
            staked_balance: U256::zero(),
            allocations: HashMap::new(),
        }
    }

    fn ensure_network(&self, caller: Address) -> NetworkResult<()> {
        if caller == self.network {
            Ok(())
        } else {
            Err(NetworkError::AccessDenied)
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn network_token(&self) -> Token {
        self.network_token
    }

    #[must_use]
    pub fn gov_token(&self) -> Token {
        self.gov_token
    }

    #[must_use]
    pub fn pool_token(&self) -> Token {
        self.pool_token
    }

    /// Network tokens owed to pool-token holders.
    #[must_use]
    pub fn staked_balance(&self) -> U256 {
        self.staked_balance
    }

    /// Network tokens currently lent to `pool`.
    #[must_use]
    pub fn allocated_liquidity(&self, pool: Token) -> U256 {
        self.allocations.get(&pool).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn pool_token_supply(&self, ledger: &TokenLedger) -> U256 {
        ledger.total_supply(self.pool_token)
    }

    /// Network liquidity `pool` may still request under its minting limit.
    #[must_use]
    pub fn unallocated_liquidity(&self, settings: &dyn NetworkSettings, pool: Token) -> U256 {
        settings
            .pool_minting_limit(pool)
            .saturating_sub(self.allocated_liquidity(pool))
    }

    /// Network liquidity is lent only to whitelisted pools living in the
    /// latest collection of their type.
    #[must_use]
    pub fn is_network_liquidity_enabled(
        &self,
        settings: &dyn NetworkSettings,
        pool: Token,
        collection_is_latest: bool,
    ) -> bool {
        collection_is_latest && settings.is_token_whitelisted(pool)
    }

    /// Pool tokens worth `amount` network tokens at the current exchange rate.
    fn underlying_to_pool_token(&self, ledger: &TokenLedger, amount: U256) -> NetworkResult<U256> {
        let supply = self.pool_token_supply(ledger);
        if supply.is_zero() || self.staked_balance.is_zero() {
            Ok(amount)
        } else {
            mul_div_f(amount, supply, self.staked_balance)
        }
    }

    /// Computes a network-token deposit without applying it.
    pub fn deposit_amounts(
        &self,
        ledger: &TokenLedger,
        amount: U256,
    ) -> NetworkResult<NetworkTokenDepositAmounts> {
        if amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        let pool_token_amount = self.underlying_to_pool_token(ledger, amount)?;
        Ok(NetworkTokenDepositAmounts {
            pool_token_amount,
            gov_token_amount: pool_token_amount,
        })
    }

    /// Burns the network tokens already sent to the pool and mints pool and
    /// governance tokens to `provider`.
    pub fn deposit_for(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        provider: Address,
        amount: U256,
    ) -> NetworkResult<NetworkTokenDepositAmounts> {
        self.ensure_network(caller)?;
        let amounts = self.deposit_amounts(ledger, amount)?;
        let staked_balance = add(self.staked_balance, amount)?;

        ledger.burn(self.network_token, self.address, amount)?;
        ledger.mint(self.pool_token, provider, amounts.pool_token_amount)?;
        ledger.mint(self.gov_token, provider, amounts.gov_token_amount)?;
        self.staked_balance = staked_balance;

        debug!(provider = %provider, amount = %amount, pool_token_amount = %amounts.pool_token_amount, "Network token deposit applied");
        Ok(amounts)
    }

    /// Computes a network-token withdrawal without applying it.
    pub fn withdrawal_amounts(
        &self,
        ledger: &TokenLedger,
        pool_token_amount: U256,
        withdrawal_fee_ppm: u32,
    ) -> NetworkResult<NetworkTokenWithdrawalAmounts> {
        if pool_token_amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        let supply = self.pool_token_supply(ledger);
        if pool_token_amount > supply {
            return Err(NetworkError::InsufficientBalance);
        }
        let claim = mul_div_f(pool_token_amount, self.staked_balance, supply)?;
        let fee = fee_amount(claim, withdrawal_fee_ppm)?;
        Ok(NetworkTokenWithdrawalAmounts {
            network_token_amount: claim - fee,
            pool_token_amount,
            gov_token_amount: pool_token_amount,
            withdrawal_fee_amount: fee,
        })
    }

    /// Burns the pool and governance tokens held by the pool and mints the
    /// network tokens owed to `provider`. The withdrawal fee stays staked.
    pub fn withdraw(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        provider: Address,
        pool_token_amount: U256,
        withdrawal_fee_ppm: u32,
    ) -> NetworkResult<NetworkTokenWithdrawalAmounts> {
        self.ensure_network(caller)?;
        let amounts = self.withdrawal_amounts(ledger, pool_token_amount, withdrawal_fee_ppm)?;

        ledger.burn(self.pool_token, self.address, amounts.pool_token_amount)?;
        ledger.burn(self.gov_token, self.address, amounts.gov_token_amount)?;
        ledger.mint(self.network_token, provider, amounts.network_token_amount)?;
        self.staked_balance -= amounts.network_token_amount;

        debug!(provider = %provider, network_token_amount = %amounts.network_token_amount, fee = %amounts.withdrawal_fee_amount, "Network token withdrawal applied");
        Ok(amounts)
    }

    /// Lends `amount` network tokens to `pool`: mints them into the vault and
    /// books protocol-owned pool tokens against them.
    pub fn request_liquidity(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        settings: &dyn NetworkSettings,
        context_id: ContextId,
        pool: Token,
        amount: U256,
    ) -> NetworkResult<()> {
        self.ensure_network(caller)?;
        if amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        let allocated = add(self.allocated_liquidity(pool), amount)?;
        if allocated > settings.pool_minting_limit(pool) {
            return Err(NetworkError::MintingLimitExceeded);
        }
        let pool_token_amount = self.underlying_to_pool_token(ledger, amount)?;
        let staked_balance = add(self.staked_balance, amount)?;

        ledger.mint(self.pool_token, self.address, pool_token_amount)?;
        ledger.mint(self.network_token, self.vault, amount)?;
        self.staked_balance = staked_balance;
        self.allocations.insert(pool, allocated);

        info!(context_id = %context_id, pool = %pool, amount = %amount, allocated = %allocated, "Network liquidity requested");
        Ok(())
    }

    /// Takes back `amount` network tokens from `pool` and burns them from the
    /// vault. Only the part covered by the pool's allocation reduces the
    /// staked balance.
    pub fn renounce_liquidity(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        context_id: ContextId,
        pool: Token,
        amount: U256,
    ) -> NetworkResult<()> {
        self.ensure_network(caller)?;
        if amount.is_zero() {
            return Err(NetworkError::ZeroValue);
        }
        let allocated = self.allocated_liquidity(pool);
        let covered = min(amount, allocated);
        let pool_token_amount = if self.staked_balance.is_zero() {
            U256::zero()
        } else {
            min(
                mul_div_f(covered, self.pool_token_supply(ledger), self.staked_balance)?,
                ledger.balance_of(self.pool_token, self.address),
            )
        };

        ledger.burn(self.network_token, self.vault, amount)?;
        ledger.burn(self.pool_token, self.address, pool_token_amount)?;
        self.staked_balance = self.staked_balance.saturating_sub(covered);
        self.allocations.insert(pool, allocated - covered);

        info!(context_id = %context_id, pool = %pool, amount = %amount, covered = %covered, "Network liquidity renounced");
        Ok(())
    }

    /// Mints network tokens to `recipient`.
    pub fn mint(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        recipient: Address,
        amount: U256,
    ) -> NetworkResult<()> {
        self.ensure_network(caller)?;
        if recipient.is_zero() {
            return Err(NetworkError::InvalidAddress);
        }
        ledger.mint(self.network_token, recipient, amount)
    }

    /// Burns network tokens held by the vault.
    pub fn burn_from_vault(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        amount: U256,
    ) -> NetworkResult<()> {
        self.ensure_network(caller)?;
        ledger.burn(self.network_token, self.vault, amount)
    }

    /// Credits trading fees earned in network tokens to the stakers.
    pub fn on_fees_collected(
        &mut self,
        caller: Address,
        pool: Token,
        amount: U256,
        fee_type: FeeType,
    ) -> NetworkResult<()> {
        self.ensure_network(caller)?;
        self.staked_balance = add(self.staked_balance, amount)?;
        debug!(pool = %pool, amount = %amount, fee_type = %fee_type, "Fees collected");
        Ok(())
    }
}

impl Versioned for NetworkTokenPool {
    fn version(&self) -> u16 {
        VERSION
    }
}
