use amm_network_domain::error::NetworkResult;
use amm_network_domain::fees::ensure_valid_fee;
use amm_network_domain::token::Token;
use primitive_types::U256;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Network-wide configuration read by the router and the network token pool.
pub trait NetworkSettings {
    /// Whether pools may be created for the token and receive network liquidity.
    fn is_token_whitelisted(&self, token: Token) -> bool;

    /// Maximum network-token liquidity that may be allocated to the pool.
    fn pool_minting_limit(&self, pool: Token) -> U256;

    /// Fee kept by the pool on withdrawals.
    fn withdrawal_fee_ppm(&self) -> u32;
}

#[derive(Debug, Default)]
struct SettingsState {
    whitelist: HashSet<Token>,
    minting_limits: HashMap<Token, U256>,
    withdrawal_fee_ppm: u32,
}

/// In-memory settings. Clones share the same state, so a handle kept outside
/// the network can reconfigure it.
#[derive(Debug, Clone, Default)]
pub struct MemoryNetworkSettings {
    state: Arc<RwLock<SettingsState>>,
}

impl MemoryNetworkSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, SettingsState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SettingsState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_token_to_whitelist(&self, token: Token) {
        self.write().whitelist.insert(token);
    }

    pub fn remove_token_from_whitelist(&self, token: Token) {
        self.write().whitelist.remove(&token);
    }

    pub fn set_pool_minting_limit(&self, pool: Token, limit: U256) {
        self.write().minting_limits.insert(pool, limit);
    }

    pub fn set_withdrawal_fee_ppm(&self, fee_ppm: u32) -> NetworkResult<()> {
        ensure_valid_fee(fee_ppm)?;
        self.write().withdrawal_fee_ppm = fee_ppm;
        Ok(())
    }
}

impl NetworkSettings for MemoryNetworkSettings {
    fn is_token_whitelisted(&self, token: Token) -> bool {
        self.read().whitelist.contains(&token)
    }

    fn pool_minting_limit(&self, pool: Token) -> U256 {
        self.read()
            .minting_limits
            .get(&pool)
            .copied()
            .unwrap_or_default()
    }

    fn withdrawal_fee_ppm(&self) -> u32 {
        self.read().withdrawal_fee_ppm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm_network_domain::error::NetworkError;

    #[test]
    fn test_shared_handle() {
        let settings = MemoryNetworkSettings::new();
        let handle = settings.clone();
        let token = Token::from_label("TKN");

        handle.add_token_to_whitelist(token);
        handle.set_pool_minting_limit(token, U256::from(1000u64));
        assert!(settings.is_token_whitelisted(token));
        assert_eq!(settings.pool_minting_limit(token), U256::from(1000u64));

        handle.remove_token_from_whitelist(token);
        assert!(!settings.is_token_whitelisted(token));
    }

    #[test]
    fn test_withdrawal_fee_validation() {
        let settings = MemoryNetworkSettings::new();
        assert_eq!(
            settings.set_withdrawal_fee_ppm(1_000_001),
            Err(NetworkError::InvalidFee)
        );
        settings.set_withdrawal_fee_ppm(2_500).unwrap();
        assert_eq!(settings.withdrawal_fee_ppm(), 2_500);
    }
}
