//! Parts-per-million fee arithmetic.

use crate::error::{NetworkError, NetworkResult};
use crate::math::{mul_div_c, mul_div_f};
use primitive_types::U256;

/// Denominator of every fee expressed in parts per million.
pub const PPM_RESOLUTION: u32 = 1_000_000;

/// Trading fee assigned to new pools unless the collection owner changes it.
pub const DEFAULT_TRADING_FEE_PPM: u32 = 2_000;

/// Returns true when the fee does not exceed [`PPM_RESOLUTION`].
#[must_use]
pub const fn is_valid_fee(fee_ppm: u32) -> bool {
    fee_ppm <= PPM_RESOLUTION
}

/// Validates a fee value.
pub fn ensure_valid_fee(fee_ppm: u32) -> NetworkResult<()> {
    if is_valid_fee(fee_ppm) {
        Ok(())
    } else {
        Err(NetworkError::InvalidFee)
    }
}

/// Fee charged on `amount`, rounded down.
pub fn fee_amount(amount: U256, fee_ppm: u32) -> NetworkResult<U256> {
    ensure_valid_fee(fee_ppm)?;
    mul_div_f(amount, U256::from(fee_ppm), U256::from(PPM_RESOLUTION))
}

/// Smallest gross amount that still leaves `net` after the fee is deducted.
pub fn amount_before_fee(net: U256, fee_ppm: u32) -> NetworkResult<U256> {
    ensure_valid_fee(fee_ppm)?;
    if fee_ppm == PPM_RESOLUTION {
        return Err(NetworkError::InvalidFee);
    }
    mul_div_c(
        net,
        U256::from(PPM_RESOLUTION),
        U256::from(PPM_RESOLUTION - fee_ppm),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_bounds() {
        assert!(is_valid_fee(0));
        assert!(is_valid_fee(PPM_RESOLUTION));
        assert!(!is_valid_fee(PPM_RESOLUTION + 1));
        assert_eq!(
            fee_amount(U256::one(), PPM_RESOLUTION + 1),
            Err(NetworkError::InvalidFee)
        );
    }

    #[test]
    fn test_fee_amount() {
        // 0.2% of 90_909
        assert_eq!(
            fee_amount(U256::from(90_909u64), 2_000).unwrap(),
            U256::from(181u64)
        );
        assert_eq!(fee_amount(U256::from(499u64), 2_000).unwrap(), U256::zero());
    }

    #[test]
    fn test_amount_before_fee() {
        let gross = amount_before_fee(U256::from(90_728u64), 2_000).unwrap();
        assert!(gross - fee_amount(gross, 2_000).unwrap() >= U256::from(90_728u64));
        assert_eq!(
            amount_before_fee(U256::from(5u64), 0).unwrap(),
            U256::from(5u64)
        );
        assert_eq!(
            amount_before_fee(U256::one(), PPM_RESOLUTION),
            Err(NetworkError::InvalidFee)
        );
    }
}
