use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rational number `n / d`. A zero denominator marks an unset value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    pub n: U256,
    pub d: U256,
}

impl Fraction {
    /// The unset fraction `0 / 0`.
    pub const ZERO: Fraction = Fraction {
        n: U256([0; 4]),
        d: U256([0; 4]),
    };

    pub fn new(n: impl Into<U256>, d: impl Into<U256>) -> Self {
        Self {
            n: n.into(),
            d: d.into(),
        }
    }

    /// A fraction is usable only with a non-zero denominator.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.d.is_zero()
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        !self.n.is_zero() && !self.d.is_zero()
    }

    /// Decimal approximation, `None` when unset or out of range.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        if !self.is_valid() {
            return None;
        }
        let n = Decimal::from_str(&self.n.to_string()).ok()?;
        let d = Decimal::from_str(&self.d.to_string()).ok()?;
        n.checked_div(d)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validity() {
        assert!(!Fraction::ZERO.is_valid());
        assert!(Fraction::new(0u64, 1u64).is_valid());
        assert!(!Fraction::new(0u64, 1u64).is_positive());
        assert!(Fraction::new(3u64, 2u64).is_positive());
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Fraction::new(3u64, 2u64).to_decimal(), Some(dec!(1.5)));
        assert_eq!(Fraction::ZERO.to_decimal(), None);
        assert_eq!(Fraction::new(1u64, 4u64).to_string(), "1/4");
    }
}
