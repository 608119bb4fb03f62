use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};
use wallet_sync_domain::app::WalletSummary;
use wallet_sync_domain::error::SyncError;
use wallet_sync_domain::slice::SliceKind;
use wallet_sync_provider::connection::WalletConnection;
use wallet_sync_provider::syncer::SyncerMode;
use wallet_sync_provider::validation::validate_connection;

use crate::state::WalletSlices;
use crate::status::SyncContext;
use crate::sync::{PollHandle, SyncerSlot, bind_syncer};

/// Binds providers to slices and owns every poll-loop handle.
///
/// Swaps are serialized: the handle set is guarded by a lock held for the
/// whole swap, so no binding from an old provider can overlap a new one.
pub struct ProviderCoordinator {
    context: Arc<SyncContext>,
    slices: WalletSlices,
    syncer_slot: SyncerSlot,
    poll_interval: Duration,
    active: Mutex<Vec<PollHandle>>,
}

impl ProviderCoordinator {
    pub fn new(
        context: Arc<SyncContext>,
        slices: WalletSlices,
        syncer_slot: SyncerSlot,
        poll_interval: Duration,
    ) -> Self {
        Self {
            context,
            slices,
            syncer_slot,
            poll_interval,
            active: Mutex::new(Vec::new()),
        }
    }

    /// Swap the active provider.
    ///
    /// The connection is validated before anything is touched; a malformed
    /// one leaves the previous provider fully bound. On success the old
    /// poll loops are stopped, address and network return to their initial
    /// values, the fetch generation advances, and the new connection's
    /// syncers are bound in slice order. A pull-capable balance syncer is
    /// installed for the balance engine instead of being polled.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::CapabilityShape` when `connection` is malformed.
    pub async fn swap(&self, connection: WalletConnection) -> Result<(), SyncError> {
        validate_connection(&connection)?;
        let mut active = self.active.lock().await;
        info!(wallet = %connection.name, "provider swap started");
        self.teardown(&mut active);

        let WalletConnection {
            name,
            address,
            network,
            balance,
        } = connection;
        *self.syncer_slot.write().await = balance.clone();

        if let Some(syncer) = address
            && let Some(handle) = bind_syncer(
                SliceKind::Address,
                &self.slices.address,
                &syncer,
                &self.context,
                self.poll_interval,
            )
        {
            active.push(handle);
        }
        if let Some(syncer) = network
            && let Some(handle) = bind_syncer(
                SliceKind::Network,
                &self.slices.network,
                &syncer,
                &self.context,
                self.poll_interval,
            )
        {
            active.push(handle);
        }
        if let Some(syncer) = balance
            && syncer.mode() == SyncerMode::Push
        {
            syncer.on_change(self.slices.balance.setter());
            debug!(slice = %SliceKind::Balance, "bound in push mode");
        }

        self.slices.wallet.set(WalletSummary::named(name));
        info!("provider swap completed");
        Ok(())
    }

    /// Tear down the active provider without a replacement.
    pub async fn clear(&self) {
        let mut active = self.active.lock().await;
        info!("provider cleared");
        self.teardown(&mut active);
        *self.syncer_slot.write().await = None;
        self.slices.balance.reset();
        self.slices.wallet.reset();
    }

    /// Stop every active poll loop without touching slice values.
    pub async fn abort_all(&self) {
        let mut active = self.active.lock().await;
        for handle in active.drain(..) {
            handle.abort();
        }
    }

    /// Slices currently refreshed by a poll loop.
    pub async fn active_slices(&self) -> Vec<SliceKind> {
        self.active.lock().await.iter().map(PollHandle::slice).collect()
    }

    fn teardown(&self, active: &mut Vec<PollHandle>) {
        for handle in active.drain(..) {
            handle.abort();
        }
        self.slices.address.reset();
        self.slices.network.reset();
        self.context.advance_generation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::RwLock;
    use wallet_sync_domain::app::AppState;
    use wallet_sync_domain::value_objects::{Address, Balance, NetworkId};
    use wallet_sync_provider::mock::{PushHandle, ScriptedPull, connected_wallet};
    use wallet_sync_provider::syncer::Syncer;

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn coordinator() -> (ProviderCoordinator, WalletSlices, SyncerSlot, Arc<SyncContext>) {
        let context = Arc::new(SyncContext::new());
        let slices = WalletSlices::new(AppState::default());
        let slot: SyncerSlot = Arc::new(RwLock::new(None));
        let coordinator = ProviderCoordinator::new(
            Arc::clone(&context),
            slices.clone(),
            Arc::clone(&slot),
            Duration::from_millis(200),
        );
        (coordinator, slices, slot, context)
    }

    fn push_wallet(name: &str) -> (WalletConnection, PushHandle<Option<Address>>) {
        let push = PushHandle::new();
        let connection = WalletConnection::new(name)
            .with_address(push.syncer())
            .with_network(Syncer::inert())
            .with_balance(Syncer::inert());
        (connection, push)
    }

    #[tokio::test]
    async fn test_malformed_connection_leaves_previous_provider_bound() {
        let (coordinator, slices, _slot, _context) = coordinator();
        let (connection, push) = push_wallet("wallet-a");
        coordinator.swap(connection).await.unwrap();
        push.emit(Some(Address::from("0xaaa")));
        assert_eq!(slices.address.current(), Some(Address::from("0xaaa")));

        let malformed = WalletConnection::new("wallet-b")
            .with_address(Syncer::inert())
            .with_network(Syncer::inert());
        let error = coordinator.swap(malformed).await.unwrap_err();
        assert_eq!(error.to_string(), "balance must be of type syncer");

        assert_eq!(slices.address.current(), Some(Address::from("0xaaa")));
        assert_eq!(slices.wallet.current().name.as_deref(), Some("wallet-a"));
        push.emit(Some(Address::from("0xaa2")));
        assert_eq!(slices.address.current(), Some(Address::from("0xaa2")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_swap_stops_previous_poll_set_before_binding() {
        let (coordinator, slices, _slot, _context) = coordinator();
        let first = ScriptedPull::ok(Some(Address::from("0xaaa")));
        let connection = WalletConnection::new("wallet-a")
            .with_address(first.syncer())
            .with_network(Syncer::inert())
            .with_balance(Syncer::inert());
        coordinator.swap(connection).await.unwrap();
        settle().await;
        tokio::time::advance(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(first.calls(), 3);
        assert_eq!(slices.address.current(), Some(Address::from("0xaaa")));

        let second = ScriptedPull::ok(Some(Address::from("0xbbb")));
        let connection = WalletConnection::new("wallet-b")
            .with_address(second.syncer())
            .with_network(Syncer::inert())
            .with_balance(Syncer::inert());
        coordinator.swap(connection).await.unwrap();
        assert_eq!(slices.address.current(), None);
        settle().await;

        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(first.calls(), 3);
        assert_eq!(second.calls(), 5);
        assert_eq!(slices.address.current(), Some(Address::from("0xbbb")));
    }

    #[tokio::test]
    async fn test_swap_installs_balance_syncer_without_polling() {
        let (coordinator, _slices, slot, _context) = coordinator();
        let connection = connected_wallet(
            "wallet-a",
            Address::from("0xaaa"),
            NetworkId::new(1),
            Balance::new("1.0"),
        );
        coordinator.swap(connection).await.unwrap();
        assert_eq!(
            coordinator.active_slices().await,
            vec![SliceKind::Address, SliceKind::Network]
        );
        assert!(slot.read().await.is_some());
    }

    #[tokio::test]
    async fn test_push_only_provider_needs_no_poll_handles() {
        let (coordinator, slices, _slot, _context) = coordinator();
        let balance_push: PushHandle<Balance> = PushHandle::new();
        let connection = WalletConnection::new("wallet-a")
            .with_address(PushHandle::new().syncer())
            .with_network(PushHandle::new().syncer())
            .with_balance(balance_push.syncer());
        coordinator.swap(connection).await.unwrap();
        assert!(coordinator.active_slices().await.is_empty());

        balance_push.emit(Balance::new("3.5"));
        assert_eq!(slices.balance.current(), Balance::new("3.5"));
    }

    #[tokio::test]
    async fn test_swap_advances_generation_and_resets_slices() {
        let (coordinator, slices, _slot, context) = coordinator();
        let (connection, push) = push_wallet("wallet-a");
        coordinator.swap(connection).await.unwrap();
        push.emit(Some(Address::from("0xaaa")));
        let generation = context.generation();

        let (connection, _push_b) = push_wallet("wallet-b");
        coordinator.swap(connection).await.unwrap();
        assert_eq!(slices.address.current(), None);
        assert_eq!(slices.network.current(), None);
        assert!(context.generation() > generation);
        assert_eq!(slices.wallet.current().name.as_deref(), Some("wallet-b"));
    }

    #[tokio::test]
    async fn test_clear_resets_wallet_state_and_drops_syncer_slot() {
        let (coordinator, slices, slot, _context) = coordinator();
        let connection = connected_wallet(
            "wallet-a",
            Address::from("0xaaa"),
            NetworkId::new(1),
            Balance::new("1.0"),
        );
        coordinator.swap(connection).await.unwrap();
        slices.balance.set(Balance::new("9.9"));

        coordinator.clear().await;
        assert!(coordinator.active_slices().await.is_empty());
        assert!(slot.read().await.is_none());
        assert_eq!(slices.balance.current(), Balance::default());
        assert_eq!(slices.wallet.current(), WalletSummary::default());
        assert_eq!(slices.address.current(), None);
    }
}
