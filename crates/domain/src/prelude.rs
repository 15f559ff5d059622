//! Prelude module for convenient imports.
//!
//! ```rust
//! use amm_network_domain::prelude::*;
//! ```

pub use crate::enums::FeeType;
pub use crate::error::{NetworkError, NetworkResult};
pub use crate::events::{EventLog, NetworkEvent, PoolCollectionEvent};
pub use crate::fees::{
    DEFAULT_TRADING_FEE_PPM, PPM_RESOLUTION, amount_before_fee, ensure_valid_fee, fee_amount,
    is_valid_fee,
};
pub use crate::math::{mul_div_c, mul_div_f};
pub use crate::pool::{
    DepositAmounts, NetworkTokenDepositAmounts, NetworkTokenWithdrawalAmounts, Pool,
    PoolLiquidity, TradeAmountsAndFee, WithdrawalAmounts, WithdrawalBalances,
};
pub use crate::token::{Address, Token, TokenMetadata, derive_address};
pub use crate::value_objects::{ContextId, ContextIdBuilder, Fraction, SignedAmount};
pub use primitive_types::{H256, U256};
