use primitive_types::H160;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account or contract address.
pub type Address = H160;

/// Derives a deterministic address from a label.
///
/// Used for default component addresses and for pool tokens, which are keyed
/// by the collection that created them and their reserve token.
#[must_use]
pub fn derive_address(parts: &[&[u8]]) -> Address {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"amm-network/address");
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let hash = hasher.finalize();
    Address::from_slice(&hash.as_bytes()[..20])
}

/// A token identified by its contract address.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Token(pub Address);

impl Token {
    /// The native asset marker address.
    pub const NATIVE: Token = Token(H160([0xee; 20]));

    /// Creates a token from its address.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// Creates a token whose address is derived from a label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self(derive_address(&[b"token", label.as_bytes()]))
    }

    /// Returns the token address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }

    /// Returns true for the native asset.
    #[must_use]
    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    /// Returns true for the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Address> for Token {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Descriptive token data kept by the token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Ticker symbol.
    pub symbol: String,
    /// Human readable name.
    pub name: String,
    /// Decimal places.
    pub decimals: u8,
}

impl TokenMetadata {
    /// Creates new token metadata.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            decimals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_token() {
        assert!(Token::NATIVE.is_native());
        assert!(!Token::from_label("TKN").is_native());
        assert_eq!(
            Token::NATIVE.to_string(),
            "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
        );
    }

    #[test]
    fn test_derived_addresses_are_stable_and_distinct() {
        assert_eq!(Token::from_label("A"), Token::from_label("A"));
        assert_ne!(Token::from_label("A"), Token::from_label("B"));
        assert_ne!(
            derive_address(&[b"ab", b"c"]),
            derive_address(&[b"a", b"bc"])
        );
        assert!(!Token::from_label("A").is_zero());
    }
}
