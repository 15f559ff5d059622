//! Accounting and routing engine of the AMM network.
//!
//! This crate wires the domain types into working components:
//! - Pool collections holding the per-pool state machines
//! - The network token pool lending network liquidity to the pools
//! - The network router with its registry and deposit, withdrawal and
//!   trade flows
//! - The collaborators the router depends on, with in-memory implementations

/// Prelude module for convenient imports.
pub mod prelude;

/// Ownership, versioning and reentrancy protection.
pub mod access;
/// Vault, settings, pending withdrawals and clock.
pub mod collaborators;
/// Component configuration.
pub mod config;
/// In-memory token balances.
pub mod ledger;
/// The network router.
pub mod network;
/// Network token pool.
pub mod network_token_pool;
/// Pool collections.
pub mod pool_collection;
