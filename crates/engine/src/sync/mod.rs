//! Slice synchronization machinery.
//!
//! Provides:
//! - Cancelable, time-bounded balance fetches
//! - Push and poll syncer binding with interval lifecycle
//! - The derived balance engine

mod balance;
mod binding;
mod fetch;

pub use balance::*;
pub use binding::*;
pub use fetch::*;
