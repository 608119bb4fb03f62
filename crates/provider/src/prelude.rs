//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use wallet_sync_provider::prelude::*;
//! ```

// Connection
pub use crate::connection::WalletConnection;

// Syncer
pub use crate::syncer::{PullFn, PullFuture, SetFn, SubscribeFn, Syncer, SyncerMode};

// Validation
pub use crate::validation::validate_connection;
