//! Domain types for the AMM network.
//!
//! This crate holds everything the network components share:
//! - Token addresses and metadata
//! - Fixed-point and constant product math with PPM fees
//! - Pool data and the amounts returned by pool computations
//! - Events emitted by the router and the pool collections
//! - The error taxonomy

/// Prelude module for convenient imports.
pub mod prelude;

/// Fee type enumerations.
pub mod enums;
/// Error taxonomy.
pub mod error;
/// Router and pool collection events.
pub mod events;
/// PPM fee arithmetic.
pub mod fees;
/// Pricing math.
pub mod math;
/// Pool data.
pub mod pool;
/// Token addresses and metadata.
pub mod token;
/// Value objects.
pub mod value_objects;
