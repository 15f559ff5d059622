use crate::error::{NetworkError, NetworkResult};
use crate::math::mul_div::{add, mul_div_c, mul_div_f};
use primitive_types::U256;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Output amount for `source_amount` in a constant product pool (x * y = k),
/// before any fee is taken.
///
/// formula: target = target_balance * source_amount / (source_balance + source_amount)
pub fn target_amount(
    source_balance: U256,
    target_balance: U256,
    source_amount: U256,
) -> NetworkResult<U256> {
    if source_balance.is_zero() || target_balance.is_zero() {
        return Err(NetworkError::InsufficientLiquidity);
    }
    mul_div_f(
        target_balance,
        source_amount,
        add(source_balance, source_amount)?,
    )
}

/// Input amount needed to receive `target_amount` (before fee), rounded up.
///
/// formula: source = source_balance * target_amount / (target_balance - target_amount)
pub fn source_amount(
    source_balance: U256,
    target_balance: U256,
    target_amount: U256,
) -> NetworkResult<U256> {
    if source_balance.is_zero() || target_amount >= target_balance {
        return Err(NetworkError::InsufficientLiquidity);
    }
    mul_div_c(source_balance, target_amount, target_balance - target_amount)
}

/// Calculates the constant product K.
pub fn trading_liquidity_product(base: U256, network: U256) -> NetworkResult<U256> {
    base.checked_mul(network).ok_or(NetworkError::Overflow)
}

/// Spot price of the base token in network tokens (network / base).
pub fn spot_rate(base: U256, network: U256) -> Option<Decimal> {
    if base.is_zero() {
        return None;
    }
    let base = Decimal::from_str(&base.to_string()).ok()?;
    let network = Decimal::from_str(&network.to_string()).ok()?;
    network.checked_div(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_target_amount() {
        // 1_000_000 * 100_000 / 1_100_000 = 90_909.09
        let out = target_amount(
            U256::from(1_000_000u64),
            U256::from(1_000_000u64),
            U256::from(100_000u64),
        )
        .unwrap();
        assert_eq!(out, U256::from(90_909u64));
    }

    #[test]
    fn test_source_amount_inverts_target_amount() {
        let (sb, tb) = (U256::from(1_000_000u64), U256::from(2_000_000u64));
        let needed = source_amount(sb, tb, U256::from(150_000u64)).unwrap();
        assert!(target_amount(sb, tb, needed).unwrap() >= U256::from(150_000u64));
        assert!(target_amount(sb, tb, needed - 1).unwrap() < U256::from(150_000u64));
    }

    #[test]
    fn test_empty_reserves() {
        assert_eq!(
            target_amount(U256::zero(), U256::one(), U256::one()),
            Err(NetworkError::InsufficientLiquidity)
        );
        assert_eq!(
            source_amount(U256::one(), U256::from(10u64), U256::from(10u64)),
            Err(NetworkError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_spot_rate() {
        let rate = spot_rate(U256::from(2000u64), U256::from(1000u64)).unwrap();
        assert_eq!(rate, dec!(0.5));
        assert!(spot_rate(U256::zero(), U256::one()).is_none());
    }
}
