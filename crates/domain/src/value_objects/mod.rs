/// Correlation ids for emitted events.
pub mod context_id;
/// Rational numbers.
pub mod fraction;
/// Signed token amounts.
pub mod signed_amount;

pub use context_id::{ContextId, ContextIdBuilder};
pub use fraction::Fraction;
pub use signed_amount::SignedAmount;
