use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::sync::FetchHandle;

/// Progress and error state shared by every sync component.
///
/// A newer fetch overwrites `syncing` even while the older one is
/// unresolved. `error` keeps the last recorded message; success never
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct SyncStatus {
    /// Handle to the in-flight balance fetch, if any.
    pub syncing: Option<FetchHandle>,
    /// Last recorded sync error message.
    pub error: String,
}

/// Serializable view of [`SyncStatus`] for external observers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub syncing: bool,
    pub error: String,
}

/// Shared state every sync component reads and writes.
///
/// Owns the generation counter that fences stale fetch results and the
/// status record observers watch. One context per engine; independent
/// engines never share state.
pub struct SyncContext {
    generation: AtomicU64,
    fetch_seq: AtomicU64,
    status: watch::Sender<SyncStatus>,
}

impl SyncContext {
    pub fn new() -> Self {
        let (status, _rx) = watch::channel(SyncStatus::default());
        Self {
            generation: AtomicU64::new(0),
            fetch_seq: AtomicU64::new(0),
            status,
        }
    }

    /// Generation current right now.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Open a new binding epoch. Results tagged with older epochs are stale.
    pub fn advance_generation(&self) -> u64 {
        let next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation = next, "sync generation advanced");
        next
    }

    /// Whether `tag` still names the current epoch.
    pub fn is_current(&self, tag: u64) -> bool {
        self.generation() == tag
    }

    /// Unique id for a fetch operation.
    pub fn next_fetch_id(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish `handle` as the in-flight fetch.
    pub fn publish_fetch(&self, handle: FetchHandle) {
        self.status.send_modify(|status| status.syncing = Some(handle));
    }

    /// Record an error message for observers.
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.status.send_modify(|status| status.error = message);
    }

    /// Current status record.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Serializable status view.
    pub fn snapshot(&self) -> StatusSnapshot {
        let status = self.status.borrow();
        StatusSnapshot {
            syncing: status.syncing.as_ref().is_some_and(|handle| !handle.is_settled()),
            error: status.error.clone(),
        }
    }

    /// Watch handle over the status record.
    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("generation", &self.generation())
            .field("status", &*self.status.borrow())
            .finish()
    }
}
