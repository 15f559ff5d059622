//! External collaborators of the network.
//!
//! The router depends on these only through traits:
//! - [`Vault`] for custody (also used for the external protection wallet)
//! - [`PendingWithdrawals`] for the withdrawal cooldown ledger
//! - [`NetworkSettings`] for whitelisting and limits
//! - [`Clock`] for deadlines and context ids
//!
//! In-memory implementations are provided for tests and the CLI.

mod clock;
mod pending_withdrawals;
mod settings;
mod vault;

pub use clock::*;
pub use pending_withdrawals::*;
pub use settings::*;
pub use vault::*;
