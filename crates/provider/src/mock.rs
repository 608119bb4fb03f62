//! Mock wallet providers for tests.
//!
//! These helpers expect to run inside a test and unwrap their locks.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::Semaphore;
use wallet_sync_domain::error::ProviderError;
use wallet_sync_domain::value_objects::{Address, Balance, NetworkId};

use crate::connection::WalletConnection;
use crate::syncer::{SetFn, Syncer};

/// Capture point for a push-registered setter.
///
/// The syncer it produces stores the engine's setter here so a test can
/// play the provider and deliver values on demand.
pub struct PushHandle<T> {
    setter: Arc<Mutex<Option<SetFn<T>>>>,
}

impl<T: 'static> PushHandle<T> {
    pub fn new() -> Self {
        Self {
            setter: Arc::new(Mutex::new(None)),
        }
    }

    /// Push-only syncer wired to this handle.
    pub fn syncer(&self) -> Syncer<T> {
        let slot = Arc::clone(&self.setter);
        Syncer::from_push(move |setter| {
            *slot.lock().expect("lock poisoned") = Some(setter);
        })
    }

    /// Whether the engine has registered its setter.
    pub fn is_registered(&self) -> bool {
        self.setter.lock().expect("lock poisoned").is_some()
    }

    /// Deliver a value through the registered setter. Returns whether a
    /// setter was there to receive it.
    pub fn emit(&self, value: T) -> bool {
        match self.setter.lock().expect("lock poisoned").as_ref() {
            Some(setter) => {
                setter(value);
                true
            }
            None => false,
        }
    }
}

impl<T: 'static> Default for PushHandle<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull capability returning a preset result and counting invocations.
pub struct ScriptedPull<T> {
    result: Arc<RwLock<Result<T, ProviderError>>>,
    calls: Arc<AtomicU32>,
}

impl<T: Clone + Send + Sync + 'static> ScriptedPull<T> {
    pub fn ok(value: T) -> Self {
        Self {
            result: Arc::new(RwLock::new(Ok(value))),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Arc::new(RwLock::new(Err(ProviderError::from(reason)))),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Change what subsequent pulls resolve to.
    pub fn set_result(&self, result: Result<T, ProviderError>) {
        *self.result.write().expect("lock poisoned") = result;
    }

    /// Number of pulls started so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Pull-only syncer backed by the scripted result.
    pub fn syncer(&self) -> Syncer<T> {
        let result = Arc::clone(&self.result);
        let calls = Arc::clone(&self.calls);
        Syncer::from_pull(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let result = result.read().expect("lock poisoned").clone();
            async move { result }
        })
    }
}

/// Pull capability that resolves only after a matching `release` call.
///
/// Permits persist, so releasing before the pull starts still lets it
/// through. One release resolves one pull.
pub struct GatedPull<T> {
    value: Arc<RwLock<T>>,
    gate: Arc<Semaphore>,
    calls: Arc<AtomicU32>,
}

impl<T: Clone + Send + Sync + 'static> GatedPull<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
            gate: Arc::new(Semaphore::new(0)),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Allow one pending or future pull to resolve.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Change what released pulls resolve to.
    pub fn set_value(&self, value: T) {
        *self.value.write().expect("lock poisoned") = value;
    }

    /// Number of pulls started so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Pull-only syncer held behind the gate.
    pub fn syncer(&self) -> Syncer<T> {
        let value = Arc::clone(&self.value);
        let gate = Arc::clone(&self.gate);
        let calls = Arc::clone(&self.calls);
        Syncer::from_pull(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let value = Arc::clone(&value);
            let gate = Arc::clone(&gate);
            async move {
                let permit = gate.acquire().await.expect("gate closed");
                permit.forget();
                let value = value.read().expect("lock poisoned").clone();
                Ok(value)
            }
        })
    }
}

/// Pull whose future never resolves. Drives timeout paths in tests.
pub fn hanging_pull<T: Send + 'static>() -> Syncer<T> {
    Syncer::from_pull(|| std::future::pending::<Result<T, ProviderError>>())
}

/// Pull-mode connection reporting fixed values for every slice.
pub fn connected_wallet(
    name: &str,
    address: Address,
    network: NetworkId,
    balance: Balance,
) -> WalletConnection {
    WalletConnection::new(name)
        .with_address(Syncer::from_pull(move || {
            let address = Some(address.clone());
            async move { Ok(address) }
        }))
        .with_network(Syncer::from_pull(move || {
            let network = Some(network);
            async move { Ok(network) }
        }))
        .with_balance(Syncer::from_pull(move || {
            let balance = balance.clone();
            async move { Ok(balance) }
        }))
}
