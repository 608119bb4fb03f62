use std::fmt;
use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::info;
use wallet_sync_domain::app::{AppState, WalletState, WalletSummary};
use wallet_sync_domain::error::SyncError;
use wallet_sync_domain::value_objects::{Address, Balance, NetworkId};
use wallet_sync_provider::connection::WalletConnection;

use crate::config::EngineConfig;
use crate::coordinator::ProviderCoordinator;
use crate::notify::{InMemoryNotifier, TransactionNotifier};
use crate::state::{WalletSlices, spawn_state_task};
use crate::status::{StatusSnapshot, SyncContext, SyncStatus};
use crate::sync::{BalanceTracker, SyncerSlot};

/// Entry point for wallet-state synchronization.
///
/// Owns the slice stores, the provider coordinator, and the background
/// tasks that keep balance and the composed view current. Constructing an
/// engine spawns those tasks on the ambient Tokio runtime; dropping it
/// aborts them.
pub struct WalletSyncEngine {
    config: EngineConfig,
    context: Arc<SyncContext>,
    slices: WalletSlices,
    coordinator: ProviderCoordinator,
    state_rx: watch::Receiver<WalletState>,
    tracker_task: JoinHandle<()>,
    state_task: JoinHandle<()>,
}

impl WalletSyncEngine {
    /// Build an engine with the in-memory transaction notifier.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_notifier(config, Arc::new(InMemoryNotifier::new()))
    }

    /// Build an engine around a caller-supplied transaction notifier.
    ///
    /// Must run inside a Tokio runtime; the balance tracker and the
    /// composed-state task are spawned here.
    pub fn with_notifier(config: EngineConfig, notifier: Arc<dyn TransactionNotifier>) -> Self {
        let context = Arc::new(SyncContext::new());
        let slices = WalletSlices::new(config.initial_app_state());
        let syncer_slot: SyncerSlot = Arc::new(RwLock::new(None));

        let tracker = BalanceTracker::new(
            Arc::clone(&context),
            slices.balance.clone(),
            Arc::clone(&syncer_slot),
            notifier,
            config.fetch_timeout,
        );
        let tracker_task = tokio::spawn(tracker.run(
            slices.address.subscribe(),
            slices.network.subscribe(),
        ));
        let (state_rx, state_task) = spawn_state_task(slices.clone());
        let coordinator = ProviderCoordinator::new(
            Arc::clone(&context),
            slices.clone(),
            syncer_slot,
            config.poll_interval,
        );

        info!(
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            fetch_timeout_ms = config.fetch_timeout.as_millis() as u64,
            "wallet sync engine started"
        );
        Self {
            config,
            context,
            slices,
            coordinator,
            state_rx,
            tracker_task,
            state_task,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bind a wallet connection, replacing any previous provider.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::CapabilityShape` when the connection is
    /// malformed; the previous provider stays bound in that case.
    pub async fn set_provider(&self, connection: WalletConnection) -> Result<(), SyncError> {
        self.coordinator.swap(connection).await
    }

    /// Drop the active provider and return wallet slices to their initial
    /// values. App metadata is untouched.
    pub async fn clear_provider(&self) {
        self.coordinator.clear().await;
    }

    pub fn address(&self) -> Option<Address> {
        self.slices.address.current()
    }

    pub fn watch_address(&self) -> watch::Receiver<Option<Address>> {
        self.slices.address.subscribe()
    }

    pub fn network(&self) -> Option<NetworkId> {
        self.slices.network.current()
    }

    pub fn watch_network(&self) -> watch::Receiver<Option<NetworkId>> {
        self.slices.network.subscribe()
    }

    pub fn balance(&self) -> Balance {
        self.slices.balance.current()
    }

    pub fn watch_balance(&self) -> watch::Receiver<Balance> {
        self.slices.balance.subscribe()
    }

    pub fn wallet(&self) -> WalletSummary {
        self.slices.wallet.current()
    }

    pub fn app(&self) -> AppState {
        self.slices.app.current()
    }

    /// Apply `mutate` to the app slice. Observers are notified only when
    /// the result differs.
    pub fn update_app<F: FnOnce(&mut AppState)>(&self, mutate: F) {
        self.slices.app.update(mutate);
    }

    /// Composed view recomputed from the slices right now.
    pub fn state(&self) -> WalletState {
        self.slices.snapshot()
    }

    /// Watch handle over the composed view.
    pub fn watch_state(&self) -> watch::Receiver<WalletState> {
        self.state_rx.clone()
    }

    pub fn status(&self) -> StatusSnapshot {
        self.context.snapshot()
    }

    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.context.watch_status()
    }

    /// Stop every background task. Slice values stay readable afterwards.
    pub async fn shutdown(&self) {
        info!("wallet sync engine shutting down");
        self.context.advance_generation();
        self.coordinator.abort_all().await;
        self.tracker_task.abort();
        self.state_task.abort();
    }
}

impl Drop for WalletSyncEngine {
    fn drop(&mut self) {
        self.tracker_task.abort();
        self.state_task.abort();
    }
}

impl fmt::Debug for WalletSyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSyncEngine")
            .field("config", &self.config)
            .field("status", &self.context.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wallet_sync_provider::mock::{GatedPull, PushHandle, ScriptedPull, hanging_pull};
    use wallet_sync_provider::syncer::Syncer;

    use crate::sync::BALANCE_TIMEOUT_MESSAGE;

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn pull_balance_wallet(
        balance: &ScriptedPull<Balance>,
    ) -> (WalletConnection, PushHandle<Option<Address>>) {
        let push = PushHandle::new();
        let connection = WalletConnection::new("metamask")
            .with_address(push.syncer())
            .with_network(Syncer::inert())
            .with_balance(balance.syncer());
        (connection, push)
    }

    #[tokio::test]
    async fn test_pushed_address_triggers_balance_fetch() {
        let engine = WalletSyncEngine::new(EngineConfig::default());
        let balance = ScriptedPull::ok(Balance::new("100"));
        let (connection, push) = pull_balance_wallet(&balance);
        engine.set_provider(connection).await.unwrap();
        settle().await;

        push.emit(Some(Address::from("0xabc")));
        settle().await;

        assert_eq!(engine.address(), Some(Address::from("0xabc")));
        assert_eq!(engine.balance(), Balance::new("100"));
        assert_eq!(engine.wallet().name.as_deref(), Some("metamask"));
        assert!(!engine.status().syncing);
        assert_eq!(engine.status().error, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_balance_pull_records_timeout_message() {
        let engine = WalletSyncEngine::new(EngineConfig::default());
        let status_rx = engine.watch_status();
        let push = PushHandle::new();
        let connection = WalletConnection::new("metamask")
            .with_address(push.syncer())
            .with_network(Syncer::inert())
            .with_balance(hanging_pull());
        engine.set_provider(connection).await.unwrap();

        push.emit(Some(Address::from("0xabc")));
        settle().await;
        assert!(engine.status().syncing);

        tokio::time::advance(Duration::from_millis(2000)).await;
        settle().await;

        let status = engine.status();
        assert!(!status.syncing);
        assert_eq!(status.error, BALANCE_TIMEOUT_MESSAGE);
        assert_eq!(status_rx.borrow().error, BALANCE_TIMEOUT_MESSAGE);
        assert_eq!(engine.balance(), Balance::default());
    }

    #[tokio::test]
    async fn test_clearing_address_resets_balance() {
        let engine = WalletSyncEngine::new(EngineConfig::default());
        let balance = ScriptedPull::ok(Balance::new("100"));
        let (connection, push) = pull_balance_wallet(&balance);
        engine.set_provider(connection).await.unwrap();

        push.emit(Some(Address::from("0xabc")));
        settle().await;
        assert_eq!(engine.balance(), Balance::new("100"));

        push.emit(None);
        settle().await;
        assert_eq!(engine.address(), None);
        assert_eq!(engine.balance(), Balance::default());
    }

    #[tokio::test]
    async fn test_late_results_from_cleared_address_discarded() {
        let engine = WalletSyncEngine::new(EngineConfig::default());
        let gated = GatedPull::new(Balance::new("42"));
        let push = PushHandle::new();
        let connection = WalletConnection::new("metamask")
            .with_address(push.syncer())
            .with_network(Syncer::inert())
            .with_balance(gated.syncer());
        engine.set_provider(connection).await.unwrap();

        push.emit(Some(Address::from("0xabc")));
        settle().await;
        assert_eq!(gated.calls(), 1);
        assert!(engine.status().syncing);

        push.emit(None);
        settle().await;
        assert_eq!(engine.balance(), Balance::default());

        gated.release();
        settle().await;
        assert_eq!(engine.balance(), Balance::default());
        assert!(!engine.status().syncing);
    }

    #[tokio::test]
    async fn test_confirmed_transactions_refetch_balance() {
        let notifier = Arc::new(InMemoryNotifier::new());
        let engine = WalletSyncEngine::with_notifier(EngineConfig::default(), notifier.clone());
        let balance = ScriptedPull::ok(Balance::new("100"));
        let (connection, push) = pull_balance_wallet(&balance);
        engine.set_provider(connection).await.unwrap();

        push.emit(Some(Address::from("0xabc")));
        settle().await;
        assert_eq!(engine.balance(), Balance::new("100"));
        assert_eq!(notifier.subscription_count(), 1);

        balance.set_result(Ok(Balance::new("150")));
        let delivered = notifier.confirm(&Address::from("0xabc"), "0xfeed").await;
        assert_eq!(delivered, 1);
        settle().await;

        assert_eq!(engine.balance(), Balance::new("150"));
        assert_eq!(balance.calls(), 2);
        assert_eq!(notifier.subscription_count(), 1);
    }

    #[tokio::test]
    async fn test_composed_state_follows_slices_and_app_flags() {
        let engine = WalletSyncEngine::new(EngineConfig::default());
        let balance = ScriptedPull::ok(Balance::new("100"));
        let (connection, push) = pull_balance_wallet(&balance);
        engine.set_provider(connection).await.unwrap();

        push.emit(Some(Address::from("0xabc")));
        settle().await;

        let state = engine.state();
        assert_eq!(state.address, Some(Address::from("0xabc")));
        assert_eq!(state.balance, Balance::new("100"));
        assert_eq!(state.wallet.name.as_deref(), Some("metamask"));
        assert!(!state.mobile_device);

        engine.update_app(|app| app.mobile_device = true);
        settle().await;
        let watched = engine.watch_state().borrow().clone();
        assert!(watched.mobile_device);
        assert_eq!(watched.address, Some(Address::from("0xabc")));
    }

    #[tokio::test]
    async fn test_update_app_moves_wallet_selection_flags() {
        let engine = WalletSyncEngine::new(EngineConfig::default());
        engine.update_app(|app| app.wallet_select_in_progress = true);
        assert!(engine.app().wallet_select_in_progress);

        engine.update_app(|app| {
            app.wallet_select_in_progress = false;
            app.wallet_select_completed = true;
        });
        let app = engine.app();
        assert!(!app.wallet_select_in_progress);
        assert!(app.wallet_select_completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_mode_address_refreshes_each_period() {
        let engine = WalletSyncEngine::new(EngineConfig::default());
        let pull = ScriptedPull::ok(Some(Address::from("0xabc")));
        let connection = WalletConnection::new("ledger")
            .with_address(pull.syncer())
            .with_network(Syncer::inert())
            .with_balance(Syncer::inert());
        engine.set_provider(connection).await.unwrap();
        settle().await;
        assert_eq!(pull.calls(), 0);
        assert_eq!(engine.address(), None);

        tokio::time::advance(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(pull.calls(), 1);
        assert_eq!(engine.address(), Some(Address::from("0xabc")));

        tokio::time::advance(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(pull.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_poll_loops() {
        let engine = WalletSyncEngine::new(EngineConfig::default());
        let pull = ScriptedPull::ok(Some(Address::from("0xabc")));
        let connection = WalletConnection::new("ledger")
            .with_address(pull.syncer())
            .with_network(Syncer::inert())
            .with_balance(Syncer::inert());
        engine.set_provider(connection).await.unwrap();
        settle().await;
        tokio::time::advance(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(pull.calls(), 1);

        engine.shutdown().await;
        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(pull.calls(), 1);
        assert_eq!(engine.address(), Some(Address::from("0xabc")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_engine_stops_poll_loops() {
        let pull = ScriptedPull::ok(Some(Address::from("0xabc")));
        {
            let engine = WalletSyncEngine::new(EngineConfig::default());
            let connection = WalletConnection::new("ledger")
                .with_address(pull.syncer())
                .with_network(Syncer::inert())
                .with_balance(Syncer::inert());
            engine.set_provider(connection).await.unwrap();
            settle().await;
            tokio::time::advance(Duration::from_millis(200)).await;
            settle().await;
            assert_eq!(pull.calls(), 1);
        }

        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(pull.calls(), 1);
    }
}
