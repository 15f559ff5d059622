use crate::token::{Address, Token};
use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation id attached to every event emitted by one router operation.
///
/// Derived from the caller, the block-equivalent timestamp and the operation
/// parameters. It is advisory and not guaranteed unique.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub H256);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Incremental builder hashing the inputs of a [`ContextId`].
pub struct ContextIdBuilder {
    hasher: blake3::Hasher,
}

impl ContextIdBuilder {
    /// Starts a context id for `operation` issued by `caller` at `timestamp`.
    #[must_use]
    pub fn new(operation: &str, caller: Address, timestamp: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"amm-network/context");
        hasher.update(operation.as_bytes());
        hasher.update(caller.as_bytes());
        hasher.update(&timestamp.to_le_bytes());
        Self { hasher }
    }

    #[must_use]
    pub fn address(mut self, address: Address) -> Self {
        self.hasher.update(address.as_bytes());
        self
    }

    #[must_use]
    pub fn token(self, token: Token) -> Self {
        self.address(token.address())
    }

    #[must_use]
    pub fn amount(mut self, amount: U256) -> Self {
        for limb in amount.0 {
            self.hasher.update(&limb.to_le_bytes());
        }
        self
    }

    #[must_use]
    pub fn number(mut self, value: u64) -> Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    #[must_use]
    pub fn build(self) -> ContextId {
        let bytes: [u8; 32] = self.hasher.finalize().into();
        ContextId(H256::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_id_depends_on_inputs() {
        let caller = Address::from_low_u64_be(1);
        let a = ContextIdBuilder::new("deposit", caller, 10)
            .amount(U256::from(5u64))
            .build();
        let b = ContextIdBuilder::new("deposit", caller, 10)
            .amount(U256::from(5u64))
            .build();
        let c = ContextIdBuilder::new("deposit", caller, 11)
            .amount(U256::from(5u64))
            .build();
        let d = ContextIdBuilder::new("trade", caller, 10)
            .amount(U256::from(5u64))
            .build();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}
