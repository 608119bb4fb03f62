use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use wallet_sync_provider::syncer::SetFn;

/// Observable container for one slice of wallet state.
///
/// Holds a current value plus the initial value it was created with;
/// `reset` always restores that initial value, never a later one. Writes
/// that do not change the value are dropped, so subscribers only wake for
/// real transitions. Subscribers observe values in write order and may skip
/// intermediates, but never see them out of order.
pub struct ValueStore<T> {
    initial: T,
    tx: Arc<watch::Sender<T>>,
}

impl<T> ValueStore<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Store holding `initial`, which `reset` will later restore.
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial.clone());
        Self {
            initial,
            tx: Arc::new(tx),
        }
    }

    /// Current value.
    pub fn current(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        self.tx.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Apply `f` to the value in place, notifying subscribers if it changed.
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        self.tx.send_if_modified(|current| {
            let before = current.clone();
            f(current);
            *current != before
        });
    }

    /// Restore the value the store was created with.
    pub fn reset(&self) {
        self.set(self.initial.clone());
    }

    /// Watch handle for change notification.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Setter closure suitable for push registration.
    pub fn setter(&self) -> SetFn<T> {
        let tx = Arc::clone(&self.tx);
        Arc::new(move |value| {
            tx.send_if_modified(|current| {
                if *current == value {
                    return false;
                }
                *current = value.clone();
                true
            });
        })
    }
}

impl<T> Clone for ValueStore<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            initial: self.initial.clone(),
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueStore")
            .field("current", &*self.tx.borrow())
            .finish()
    }
}
