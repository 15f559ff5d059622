use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A token amount with a sign.
///
/// Used for the network-token arbitrage amount of a withdrawal: positive
/// values are minted into the vault, negative values are burned from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedAmount {
    /// Absolute value.
    pub magnitude: U256,
    /// True when the amount is below zero.
    pub negative: bool,
}

impl SignedAmount {
    pub const ZERO: SignedAmount = SignedAmount {
        magnitude: U256([0; 4]),
        negative: false,
    };

    /// Returns `a - b`.
    #[must_use]
    pub fn difference(a: U256, b: U256) -> Self {
        match a.cmp(&b) {
            Ordering::Less => Self {
                magnitude: b - a,
                negative: true,
            },
            _ => Self {
                magnitude: a - b,
                negative: false,
            },
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        !self.negative && !self.magnitude.is_zero()
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative && !self.magnitude.is_zero()
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difference_sign() {
        let up = SignedAmount::difference(U256::from(10u64), U256::from(4u64));
        assert!(up.is_positive());
        assert_eq!(up.magnitude, U256::from(6u64));

        let down = SignedAmount::difference(U256::from(4u64), U256::from(10u64));
        assert!(down.is_negative());
        assert_eq!(down.to_string(), "-6");

        let flat = SignedAmount::difference(U256::from(4u64), U256::from(4u64));
        assert!(flat.is_zero());
        assert!(!flat.is_positive() && !flat.is_negative());
    }
}
