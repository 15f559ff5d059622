//! Prelude module for convenient imports.
//!
//! ```rust
//! use amm_network_engine::prelude::*;
//! ```

// Re-export domain prelude
pub use amm_network_domain::prelude::*;

// Components
pub use crate::access::{Owned, ReentrancyGuard, Versioned};
pub use crate::config::{NetworkConfig, PoolCollectionConfig, STANDARD_POOL_TYPE};
pub use crate::ledger::{PermitSignature, TokenLedger};
pub use crate::network::{Network, TradeParams};
pub use crate::network_token_pool::NetworkTokenPool;
pub use crate::pool_collection::{PoolCollection, StandardPoolCollection};

// Collaborators
pub use crate::collaborators::{
    Clock, CompletedWithdrawal, DEFAULT_LOCK_DURATION, ManualClock, MemoryNetworkSettings,
    MemoryPendingWithdrawals, MemoryVault, NetworkSettings, PendingWithdrawals, SystemClock,
    Vault, WithdrawalRequest,
};
