use crate::token::Token;
use crate::value_objects::{Fraction, SignedAmount};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Liquidity figures of a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolLiquidity {
    /// Base-token reserve available for trading.
    pub base_token_trading_liquidity: U256,
    /// Network-token reserve available for trading.
    pub network_token_trading_liquidity: U256,
    /// `base * network`, refreshed on every mutation.
    pub trading_liquidity_product: U256,
    /// Base tokens owed to pool-token holders.
    pub staked_balance: U256,
}

impl PoolLiquidity {
    /// Returns true when both trading sides hold liquidity.
    #[must_use]
    pub fn is_trading_enabled(&self) -> bool {
        !self.base_token_trading_liquidity.is_zero()
            && !self.network_token_trading_liquidity.is_zero()
    }
}

/// State of one liquidity pool inside a pool collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub pool_token: Token,
    pub trading_fee_ppm: u32,
    pub deposits_enabled: bool,
    pub liquidity: PoolLiquidity,
    /// Bootstrap rate (network per base), `0/0` when unset.
    pub initial_rate: Fraction,
    /// Maximum staked balance the pool may reach.
    pub deposit_limit: U256,
}

impl Pool {
    /// Creates an empty pool record.
    #[must_use]
    pub fn new(pool_token: Token, trading_fee_ppm: u32, deposit_limit: U256) -> Self {
        Self {
            pool_token,
            trading_fee_ppm,
            deposits_enabled: false,
            liquidity: PoolLiquidity::default(),
            initial_rate: Fraction::ZERO,
            deposit_limit,
        }
    }
}

/// Result of a base-token deposit computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAmounts {
    /// Pool tokens minted to the provider.
    pub pool_token_amount: U256,
    /// Base tokens added to trading liquidity.
    pub base_token_delta_amount: U256,
    /// Network-token liquidity to request from the network token pool.
    pub network_token_delta_amount: U256,
}

/// Custody balances available to pay a withdrawal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalBalances {
    /// Base-token balance of the vault.
    pub vault: U256,
    /// Base-token balance of the external protection wallet.
    pub external_protection_wallet: U256,
}

/// Result of a base-token withdrawal computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalAmounts {
    pub base_token_amount_from_vault: U256,
    pub base_token_amount_from_external_protection_wallet: U256,
    /// Network tokens minted to the provider to cover an uncovered shortfall.
    pub network_token_amount_to_mint_for_provider: U256,
    pub base_token_trading_liquidity_delta: U256,
    pub network_token_trading_liquidity_delta: U256,
    /// Network liquidity handed back to the network token pool.
    pub network_token_amount_to_renounce: U256,
    pub network_token_arbitrage_amount: SignedAmount,
    pub base_token_withdrawal_fee_amount: U256,
}

impl WithdrawalAmounts {
    /// Base tokens paid out of custody.
    #[must_use]
    pub fn base_token_amount_paid(&self) -> U256 {
        self.base_token_amount_from_vault
            .saturating_add(self.base_token_amount_from_external_protection_wallet)
    }
}

/// Output (or input) amount of a trade plus the fee taken, in target tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeAmountsAndFee {
    pub amount: U256,
    pub fee_amount: U256,
}

/// Result of a network-token deposit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTokenDepositAmounts {
    pub pool_token_amount: U256,
    pub gov_token_amount: U256,
}

/// Result of a network-token withdrawal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTokenWithdrawalAmounts {
    pub network_token_amount: U256,
    pub pool_token_amount: U256,
    pub gov_token_amount: U256,
    pub withdrawal_fee_amount: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pool_is_empty() {
        let pool = Pool::new(Token::from_label("lpTKN"), 2_000, U256::MAX);
        assert!(!pool.deposits_enabled);
        assert!(!pool.initial_rate.is_valid());
        assert_eq!(pool.liquidity, PoolLiquidity::default());
        assert!(!pool.liquidity.is_trading_enabled());
    }
}
