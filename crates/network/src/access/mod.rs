//! Access control helpers: ownership, versioning and the reentrancy guard.

mod owned;
mod reentrancy;

pub use owned::*;
pub use reentrancy::*;
