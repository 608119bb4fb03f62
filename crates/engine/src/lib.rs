//! Reactive wallet-state synchronization engine.
//!
//! This crate keeps a set of observable wallet slices consistent with a
//! pluggable provider:
//! - Observable value stores with reset-to-initial
//! - Push and poll syncer binding with interval lifecycle management
//! - Cancelable, time-bounded balance fetches with status reporting
//! - Transaction-confirmation driven balance refresh
//! - Provider swap coordination and teardown
//! - A composed state view over every slice

/// Prelude module for convenient imports.
pub mod prelude;

/// Engine configuration.
pub mod config;
/// Provider swap coordination.
pub mod coordinator;
/// Engine facade.
pub mod engine;
/// Transaction event notification.
pub mod notify;
/// Composed state view.
pub mod state;
/// Sync status and shared context.
pub mod status;
/// Observable value stores.
pub mod store;
/// Slice synchronization machinery.
pub mod sync;
