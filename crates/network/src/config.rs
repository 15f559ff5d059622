//! Configuration of the network components.

use amm_network_domain::fees::DEFAULT_TRADING_FEE_PPM;
use amm_network_domain::token::{Address, Token, derive_address};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Pool type served by the standard constant product collection.
pub const STANDARD_POOL_TYPE: u16 = 1;

/// Configuration of the router and the network token pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the router acts as when calling its components.
    pub address: Address,
    /// Registry owner.
    pub owner: Address,
    /// The shared network token.
    pub network_token: Token,
    /// Governance token minted alongside network-token pool tokens.
    pub gov_token: Token,
    /// Address of the network token pool.
    pub network_token_pool: Address,
    /// Pool token of the network token pool.
    pub network_pool_token: Token,
    /// Custody account of pooled funds.
    pub vault: Address,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address: derive_address(&[b"network"]),
            owner: derive_address(&[b"owner"]),
            network_token: Token::from_label("NET"),
            gov_token: Token::from_label("vNET"),
            network_token_pool: derive_address(&[b"network-token-pool"]),
            network_pool_token: Token::from_label("lpNET"),
            vault: derive_address(&[b"vault"]),
        }
    }
}

/// Configuration of a pool collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolCollectionConfig {
    pub address: Address,
    /// Owner allowed to change defaults and per-pool settings.
    pub owner: Address,
    pub pool_type: u16,
    pub version: u16,
    /// Trading fee given to new pools.
    pub default_trading_fee_ppm: u32,
    /// Deposit limit given to new pools.
    pub default_deposit_limit: U256,
}

impl Default for PoolCollectionConfig {
    fn default() -> Self {
        Self {
            address: derive_address(&[b"pool-collection", &STANDARD_POOL_TYPE.to_le_bytes()]),
            owner: derive_address(&[b"owner"]),
            pool_type: STANDARD_POOL_TYPE,
            version: 1,
            default_trading_fee_ppm: DEFAULT_TRADING_FEE_PPM,
            default_deposit_limit: U256::MAX,
        }
    }
}

impl PoolCollectionConfig {
    /// Sets the collection address.
    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Sets the pool type.
    #[must_use]
    pub fn with_pool_type(mut self, pool_type: u16) -> Self {
        self.pool_type = pool_type;
        self
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: Address) -> Self {
        self.owner = owner;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let network = NetworkConfig::default();
        let collection = PoolCollectionConfig::default();
        assert_eq!(network.owner, collection.owner);
        assert_ne!(network.address, collection.address);
        assert_eq!(collection.default_trading_fee_ppm, 2_000);
        assert_eq!(collection.default_deposit_limit, U256::MAX);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PoolCollectionConfig =
            serde_json::from_str(r#"{ "pool_type": 2, "default_trading_fee_ppm": 3000 }"#)
                .unwrap();
        assert_eq!(config.pool_type, 2);
        assert_eq!(config.default_trading_fee_ppm, 3_000);
        assert_eq!(config.version, 1);
    }
}
