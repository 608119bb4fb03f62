//! Wallet provider capability contract.
//!
//! This crate defines how a connected wallet exposes its state to the sync
//! engine:
//! - Syncer capabilities pairing optional pull and push update mechanisms
//! - The wallet connection contract with its three slice syncers
//! - Structural validation run before a connection is bound
//! - Mock providers for tests

/// Prelude module for convenient imports.
pub mod prelude;

/// Wallet connection contract.
pub mod connection;
/// Mock providers.
pub mod mock;
/// Slice syncer capabilities.
pub mod syncer;
/// Connection shape validation.
pub mod validation;
