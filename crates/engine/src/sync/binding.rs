use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};
use wallet_sync_domain::error::SyncError;
use wallet_sync_domain::slice::SliceKind;
use wallet_sync_provider::syncer::{Syncer, SyncerMode};

use crate::status::SyncContext;
use crate::store::ValueStore;

/// Handle to one live poll loop.
///
/// Aborts its task when dropped, so a forgotten handle cannot leave a
/// timer running.
#[derive(Debug)]
pub struct PollHandle {
    slice: SliceKind,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Slice this loop refreshes.
    pub fn slice(&self) -> SliceKind {
        self.slice
    }

    /// Stop the loop.
    pub fn abort(&self) {
        debug!(slice = %self.slice, "poll loop stopped");
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Attach `syncer` to `store`, choosing push over poll.
///
/// Push mode registers the store's setter with the provider and needs no
/// task. Pull mode starts a poll loop with the given period, first tick one
/// full period after binding; each tick overwrites the slice on success and
/// records the failure on error, then keeps polling. A syncer with neither
/// capability leaves the slice at its initial value.
///
/// Returns the poll handle when a loop was started.
pub fn bind_syncer<T>(
    slice: SliceKind,
    store: &ValueStore<T>,
    syncer: &Syncer<T>,
    context: &Arc<SyncContext>,
    period: Duration,
) -> Option<PollHandle>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    match syncer.mode() {
        SyncerMode::Push => {
            syncer.on_change(store.setter());
            debug!(slice = %slice, "bound in push mode");
            None
        }
        SyncerMode::Pull => {
            let get = syncer.pull_fn()?;
            let store = store.clone();
            let context = Arc::clone(context);
            let task = tokio::spawn(async move {
                let mut ticker = time::interval_at(time::Instant::now() + period, period);
                loop {
                    ticker.tick().await;
                    match get().await {
                        Ok(value) => store.set(value),
                        Err(error) => {
                            let error = SyncError::fetch(slice, error.to_string());
                            warn!(slice = %slice, %error, "poll tick failed");
                            context.record_error(error.to_string());
                        }
                    }
                }
            });
            debug!(slice = %slice, period_ms = period.as_millis() as u64, "bound in poll mode");
            Some(PollHandle { slice, task })
        }
        SyncerMode::Inert => {
            debug!(slice = %slice, "syncer exposes no capabilities, slice left at initial value");
            None
        }
    }
}
