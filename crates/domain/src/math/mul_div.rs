//! 512-bit intermediate multiply/divide helpers.

use crate::error::{NetworkError, NetworkResult};
use primitive_types::{U256, U512};

fn narrow(value: U512) -> NetworkResult<U256> {
    U256::try_from(value).map_err(|_| NetworkError::Overflow)
}

/// Computes `x * y / z` rounded down.
pub fn mul_div_f(x: U256, y: U256, z: U256) -> NetworkResult<U256> {
    if z.is_zero() {
        return Err(NetworkError::DivisionByZero);
    }
    narrow(x.full_mul(y) / U512::from(z))
}

/// Computes `x * y / z` rounded up.
pub fn mul_div_c(x: U256, y: U256, z: U256) -> NetworkResult<U256> {
    if z.is_zero() {
        return Err(NetworkError::DivisionByZero);
    }
    let product = x.full_mul(y);
    let divisor = U512::from(z);
    let mut quotient = product / divisor;
    if !(product % divisor).is_zero() {
        quotient += U512::one();
    }
    narrow(quotient)
}

/// Checked addition.
pub fn add(x: U256, y: U256) -> NetworkResult<U256> {
    x.checked_add(y).ok_or(NetworkError::Overflow)
}

/// Checked multiplication.
pub fn mul(x: U256, y: U256) -> NetworkResult<U256> {
    x.checked_mul(y).ok_or(NetworkError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        let (x, y, z) = (U256::from(10u64), U256::from(10u64), U256::from(3u64));
        assert_eq!(mul_div_f(x, y, z).unwrap(), U256::from(33u64));
        assert_eq!(mul_div_c(x, y, z).unwrap(), U256::from(34u64));
        assert_eq!(
            mul_div_c(U256::from(9u64), U256::one(), U256::from(3u64)).unwrap(),
            U256::from(3u64)
        );
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // MAX * MAX / MAX fits even though the product does not.
        assert_eq!(mul_div_f(U256::MAX, U256::MAX, U256::MAX).unwrap(), U256::MAX);
        assert_eq!(
            mul_div_f(U256::MAX, U256::from(2u64), U256::one()),
            Err(NetworkError::Overflow)
        );
    }

    #[test]
    fn test_mul_div_by_zero() {
        assert_eq!(
            mul_div_f(U256::one(), U256::one(), U256::zero()),
            Err(NetworkError::DivisionByZero)
        );
        assert_eq!(
            mul_div_c(U256::one(), U256::one(), U256::zero()),
            Err(NetworkError::DivisionByZero)
        );
    }

    #[test]
    fn test_checked_helpers() {
        assert_eq!(add(U256::MAX, U256::one()), Err(NetworkError::Overflow));
        assert_eq!(mul(U256::MAX, U256::from(2u64)), Err(NetworkError::Overflow));
        assert_eq!(add(U256::one(), U256::one()).unwrap(), U256::from(2u64));
    }
}
