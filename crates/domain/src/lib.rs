//! Core domain types for wallet-state synchronization.
//!
//! This crate provides the vocabulary shared by the provider contract and
//! the sync engine:
//! - Value objects for addresses, networks, and balances
//! - Slice identity and value-presence checks
//! - App metadata and the composed wallet-state snapshot
//! - Error types for capability and sync failures

/// Prelude module for convenient imports.
pub mod prelude;

/// App metadata and composed wallet state.
pub mod app;
/// Error types.
pub mod error;
/// Slice identity and value presence.
pub mod slice;
/// Value objects for wallet state.
pub mod value_objects;
