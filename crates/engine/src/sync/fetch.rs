use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tracing::{debug, warn};
use wallet_sync_domain::slice::SliceValue;
use wallet_sync_provider::syncer::{PullFuture, SetFn};

use crate::status::SyncContext;

/// Message recorded when a balance fetch exceeds its bound.
pub const BALANCE_TIMEOUT_MESSAGE: &str =
    "There was a problem getting the balance of this wallet";

/// Lifecycle of one cancelable fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Pending,
    Fulfilled,
    Cancelled,
}

const STATE_PENDING: u8 = 0;
const STATE_FULFILLED: u8 = 1;
const STATE_CANCELLED: u8 = 2;

/// Cancelable envelope around one in-flight fetch.
///
/// Settles exactly once: the first of fulfillment and cancellation wins and
/// later attempts lose the race.
#[derive(Clone)]
pub struct FetchHandle {
    id: u64,
    state: Arc<AtomicU8>,
}

impl FetchHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            state: Arc::new(AtomicU8::new(STATE_PENDING)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> FetchState {
        match self.state.load(Ordering::SeqCst) {
            STATE_FULFILLED => FetchState::Fulfilled,
            STATE_CANCELLED => FetchState::Cancelled,
            _ => FetchState::Pending,
        }
    }

    /// Whether the fetch settled with a result.
    pub fn is_fulfilled(&self) -> bool {
        self.state() == FetchState::Fulfilled
    }

    /// Whether the fetch settled at all.
    pub fn is_settled(&self) -> bool {
        self.state() != FetchState::Pending
    }

    /// Cancel the fetch if it is still pending. Returns whether this call
    /// won the settle race.
    pub fn cancel(&self) -> bool {
        self.state
            .compare_exchange(
                STATE_PENDING,
                STATE_CANCELLED,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    fn fulfill(&self) -> bool {
        self.state
            .compare_exchange(
                STATE_PENDING,
                STATE_FULFILLED,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }
}

impl fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

/// One cancelable, time-bounded slice fetch.
///
/// The handle is published into the shared status before the pull resolves,
/// so observers can see a fetch in flight. Exactly one of the following
/// happens per fetch: the result is applied, the result is discarded
/// (absent value, pull error, or stale generation), or the timeout cancels
/// the fetch and records [`BALANCE_TIMEOUT_MESSAGE`].
pub struct TimedFetch<T> {
    pub context: Arc<SyncContext>,
    pub generation: u64,
    pub timeout: Duration,
    pub apply: SetFn<T>,
}

impl<T> TimedFetch<T>
where
    T: SliceValue + Send + 'static,
{
    /// Start `pull` on a background task and bound it by the timeout.
    pub fn spawn(self, pull: PullFuture<T>) -> FetchHandle {
        let handle = FetchHandle::new(self.context.next_fetch_id());
        self.context.publish_fetch(handle.clone());
        debug!(fetch_id = handle.id(), generation = self.generation, "fetch started");
        let task_handle = handle.clone();
        tokio::spawn(async move {
            let TimedFetch {
                context,
                generation,
                timeout,
                apply,
            } = self;
            tokio::select! {
                result = pull => match result {
                    Ok(value) => {
                        if !task_handle.fulfill() {
                            return;
                        }
                        if !context.is_current(generation) {
                            debug!(fetch_id = task_handle.id(), "stale fetch result discarded");
                            return;
                        }
                        if value.is_present() {
                            apply(value);
                            debug!(fetch_id = task_handle.id(), "fetch result applied");
                        } else {
                            debug!(fetch_id = task_handle.id(), "absent fetch result discarded");
                        }
                    }
                    Err(error) => {
                        task_handle.fulfill();
                        debug!(fetch_id = task_handle.id(), error = %error, "fetch failed, result discarded");
                    }
                },
                _ = tokio::time::sleep(timeout) => {
                    if task_handle.cancel() && context.is_current(generation) {
                        warn!(fetch_id = task_handle.id(), timeout_ms = timeout.as_millis() as u64, "fetch exceeded its bound");
                        context.record_error(BALANCE_TIMEOUT_MESSAGE);
                    }
                }
            }
        });
        handle
    }
}
