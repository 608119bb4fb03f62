//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use wallet_sync_engine::prelude::*;
//! ```

// Config
pub use crate::config::{
    DEFAULT_FETCH_TIMEOUT, DEFAULT_NETWORK_ID, DEFAULT_POLL_INTERVAL, EngineConfig,
};

// Coordinator
pub use crate::coordinator::ProviderCoordinator;

// Engine
pub use crate::engine::WalletSyncEngine;

// Notify
pub use crate::notify::{InMemoryNotifier, TransactionNotifier, TxEvent, TxEventKind};

// State
pub use crate::state::{WalletSlices, spawn_state_task};

// Status
pub use crate::status::{StatusSnapshot, SyncContext, SyncStatus};

// Store
pub use crate::store::ValueStore;

// Sync
pub use crate::sync::{
    BALANCE_TIMEOUT_MESSAGE, BalanceDecision, BalanceInputs, BalanceTracker, FetchHandle,
    FetchState, PollHandle, SyncerSlot, TimedFetch, bind_syncer, decide,
};
