//! Pool collections.
//!
//! A pool collection owns the liquidity pools of one pool type: their
//! trading liquidity, staked balances and fees, and the deposit, withdrawal
//! and trade computations over them. The router keeps collections behind the
//! [`PoolCollection`] trait and calls the mutating operations as itself.

mod standard;

pub use standard::*;

use crate::access::Versioned;
use crate::ledger::TokenLedger;
use amm_network_domain::error::NetworkResult;
use amm_network_domain::events::PoolCollectionEvent;
use amm_network_domain::pool::{
    DepositAmounts, Pool, TradeAmountsAndFee, WithdrawalAmounts, WithdrawalBalances,
};
use amm_network_domain::token::{Address, Token};
use amm_network_domain::value_objects::Fraction;
use primitive_types::U256;

/// Manages the pools of one pool type.
pub trait PoolCollection: Versioned {
    fn address(&self) -> Address;

    fn pool_type(&self) -> u16;

    fn owner(&self) -> Address;

    fn default_trading_fee_ppm(&self) -> u32;

    fn pool_count(&self) -> usize;

    fn pools(&self) -> Vec<Token>;

    fn is_pool_valid(&self, pool: Token) -> bool;

    fn pool_data(&self, pool: Token) -> Option<Pool>;

    /// Reserve token of the pool that issued `pool_token`.
    fn pool_by_pool_token(&self, pool_token: Token) -> Option<Token>;

    fn token_symbol_override(&self, token: Token) -> Option<String>;

    /// Events emitted by the collection, in order.
    fn events(&self) -> &[PoolCollectionEvent];

    fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> NetworkResult<()>;

    fn accept_ownership(&mut self, caller: Address) -> NetworkResult<()>;

    /// Creates an empty pool and its pool token. Network only.
    fn create_pool(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        token: Token,
    ) -> NetworkResult<()>;

    fn set_default_trading_fee_ppm(&mut self, caller: Address, fee_ppm: u32)
    -> NetworkResult<()>;

    fn set_trading_fee_ppm(&mut self, caller: Address, pool: Token, fee_ppm: u32)
    -> NetworkResult<()>;

    fn set_initial_rate(&mut self, caller: Address, pool: Token, rate: Fraction)
    -> NetworkResult<()>;

    fn set_deposit_limit(&mut self, caller: Address, pool: Token, limit: U256)
    -> NetworkResult<()>;

    fn enable_deposits(&mut self, caller: Address, pool: Token, status: bool)
    -> NetworkResult<()>;

    /// Overrides the symbol used to name future pool tokens of `token`.
    /// An empty symbol removes the override.
    fn set_token_symbol_override(
        &mut self,
        caller: Address,
        token: Token,
        symbol: &str,
    ) -> NetworkResult<()>;

    /// Computes a deposit without applying it.
    fn deposit_amounts(
        &self,
        ledger: &TokenLedger,
        pool: Token,
        base_token_amount: U256,
        unallocated_network_liquidity: U256,
    ) -> NetworkResult<DepositAmounts>;

    /// Applies a deposit and mints pool tokens to `provider`. Network only.
    fn deposit_for(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        provider: Address,
        pool: Token,
        base_token_amount: U256,
        unallocated_network_liquidity: U256,
    ) -> NetworkResult<DepositAmounts>;

    /// Computes a withdrawal without applying it.
    fn withdrawal_amounts(
        &self,
        ledger: &TokenLedger,
        pool: Token,
        pool_token_amount: U256,
        balances: WithdrawalBalances,
        withdrawal_fee_ppm: u32,
    ) -> NetworkResult<WithdrawalAmounts>;

    /// Applies a withdrawal and burns the pool tokens held by the
    /// collection. Network only.
    fn withdraw(
        &mut self,
        caller: Address,
        ledger: &mut TokenLedger,
        pool: Token,
        pool_token_amount: U256,
        balances: WithdrawalBalances,
        withdrawal_fee_ppm: u32,
    ) -> NetworkResult<WithdrawalAmounts>;

    /// Output amount and fee for trading `source_amount`.
    fn target_amount_and_fee(
        &self,
        source_token: Token,
        target_token: Token,
        source_amount: U256,
    ) -> NetworkResult<TradeAmountsAndFee>;

    /// Input amount needed to receive `target_amount`, and the fee taken.
    fn source_amount_and_fee(
        &self,
        source_token: Token,
        target_token: Token,
        target_amount: U256,
    ) -> NetworkResult<TradeAmountsAndFee>;

    /// Executes one trade hop. Network only.
    fn trade(
        &mut self,
        caller: Address,
        source_token: Token,
        target_token: Token,
        source_amount: U256,
        min_return_amount: U256,
    ) -> NetworkResult<TradeAmountsAndFee>;
}
