use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use wallet_sync_domain::error::ProviderError;

/// Callback a push-capable syncer invokes with each new value.
pub type SetFn<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Future returned by a pull capability.
pub type PullFuture<T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send>>;

/// Pull capability: fetch the current value on demand.
pub type PullFn<T> = Arc<dyn Fn() -> PullFuture<T> + Send + Sync>;

/// Push registration: hand the provider a setter it will call on change.
pub type SubscribeFn<T> = Arc<dyn Fn(SetFn<T>) + Send + Sync>;

/// How a syncer can drive its slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncerMode {
    Push,
    Pull,
    Inert,
}

/// One slice capability exposed by a wallet provider.
///
/// A syncer pairs an optional pull with an optional push registration. When
/// both are present the push wins and the pull is never invoked; when
/// neither is present the slice stays at its initial value.
pub struct Syncer<T> {
    pull: Option<PullFn<T>>,
    push: Option<SubscribeFn<T>>,
}

impl<T> Syncer<T> {
    /// Syncer with no capabilities.
    pub fn inert() -> Self {
        Self {
            pull: None,
            push: None,
        }
    }

    /// Pull-only syncer.
    pub fn from_pull<F, Fut>(get: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ProviderError>> + Send + 'static,
    {
        Self::inert().with_pull(get)
    }

    /// Push-only syncer.
    pub fn from_push<F>(subscribe: F) -> Self
    where
        F: Fn(SetFn<T>) + Send + Sync + 'static,
    {
        Self::inert().with_push(subscribe)
    }

    #[must_use]
    pub fn with_pull<F, Fut>(mut self, get: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ProviderError>> + Send + 'static,
    {
        self.pull = Some(Arc::new(move || Box::pin(get())));
        self
    }

    #[must_use]
    pub fn with_push<F>(mut self, subscribe: F) -> Self
    where
        F: Fn(SetFn<T>) + Send + Sync + 'static,
    {
        self.push = Some(Arc::new(subscribe));
        self
    }

    /// Mode the engine will bind this syncer in. Push wins over pull.
    pub fn mode(&self) -> SyncerMode {
        if self.push.is_some() {
            SyncerMode::Push
        } else if self.pull.is_some() {
            SyncerMode::Pull
        } else {
            SyncerMode::Inert
        }
    }

    pub fn has_pull(&self) -> bool {
        self.pull.is_some()
    }

    pub fn has_push(&self) -> bool {
        self.push.is_some()
    }

    /// Start one pull, if the capability is present.
    pub fn get(&self) -> Option<PullFuture<T>> {
        self.pull.as_ref().map(|get| get())
    }

    /// The pull capability itself, for callers that pull repeatedly.
    pub fn pull_fn(&self) -> Option<PullFn<T>> {
        self.pull.clone()
    }

    /// Register `setter` with the push capability. Returns whether a push
    /// capability was present to receive it.
    pub fn on_change(&self, setter: SetFn<T>) -> bool {
        match &self.push {
            Some(subscribe) => {
                subscribe(setter);
                true
            }
            None => false,
        }
    }
}

impl<T> Clone for Syncer<T> {
    fn clone(&self) -> Self {
        Self {
            pull: self.pull.clone(),
            push: self.push.clone(),
        }
    }
}

impl<T> fmt::Debug for Syncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Syncer")
            .field("pull", &self.pull.is_some())
            .field("push", &self.push.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wallet_sync_domain::value_objects::Balance;

    #[test]
    fn test_mode_prefers_push_over_pull() {
        let syncer: Syncer<Balance> = Syncer::inert()
            .with_pull(|| async { Ok(Balance::new("1")) })
            .with_push(|_setter| {});
        assert_eq!(syncer.mode(), SyncerMode::Push);
        assert!(syncer.has_pull());
        assert!(syncer.has_push());
    }

    #[test]
    fn test_inert_syncer_has_no_capabilities() {
        let syncer: Syncer<Balance> = Syncer::inert();
        assert_eq!(syncer.mode(), SyncerMode::Inert);
        assert!(syncer.get().is_none());
        assert!(!syncer.on_change(Arc::new(|_| {})));
    }

    #[tokio::test]
    async fn test_pull_capability_resolves_values() {
        let syncer = Syncer::from_pull(|| async { Ok(Balance::new("42")) });
        assert_eq!(syncer.mode(), SyncerMode::Pull);
        let value = syncer.get().expect("pull future").await;
        assert_eq!(value, Ok(Balance::new("42")));
    }

    #[test]
    fn test_push_registration_reaches_the_provider() {
        let registered = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&registered);
        let syncer: Syncer<Balance> = Syncer::from_push(move |setter| {
            seen.store(true, Ordering::SeqCst);
            setter(Balance::new("0.1"));
        });
        let delivered = Arc::new(AtomicBool::new(false));
        let hit = Arc::clone(&delivered);
        assert!(syncer.on_change(Arc::new(move |_value| hit.store(true, Ordering::SeqCst))));
        assert!(registered.load(Ordering::SeqCst));
        assert!(delivered.load(Ordering::SeqCst));
    }
}
