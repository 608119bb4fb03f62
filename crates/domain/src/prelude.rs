//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use wallet_sync_domain::prelude::*;
//! ```

// App
pub use crate::app::{AppState, WalletState, WalletSummary};

// Errors
pub use crate::error::{ProviderError, SyncError};

// Slices
pub use crate::slice::{SliceKind, SliceValue};

// Value objects
pub use crate::value_objects::{Address, Balance, NetworkId};
