//! Fixed-point arithmetic used by the pools.

/// Constant product pricing.
pub mod constant_product;
/// Multiply/divide with a 512-bit intermediate.
pub mod mul_div;

pub use constant_product::*;
pub use mul_div::*;
