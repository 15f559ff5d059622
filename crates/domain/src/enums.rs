use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of fee reported by `FeesCollected` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    /// Fee charged on the output side of a trade.
    Trading,
    /// Fee kept by the pool when liquidity is withdrawn.
    Withdrawal,
}

impl fmt::Display for FeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trading => write!(f, "trading"),
            Self::Withdrawal => write!(f, "withdrawal"),
        }
    }
}
