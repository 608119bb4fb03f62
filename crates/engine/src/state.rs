use tokio::sync::watch;
use tokio::task::JoinHandle;
use wallet_sync_domain::app::{AppState, WalletState, WalletSummary};
use wallet_sync_domain::value_objects::{Address, Balance, NetworkId};

use crate::store::ValueStore;

/// Bundle of every observable slice the engine exposes.
#[derive(Debug, Clone)]
pub struct WalletSlices {
    pub address: ValueStore<Option<Address>>,
    pub network: ValueStore<Option<NetworkId>>,
    pub balance: ValueStore<Balance>,
    pub wallet: ValueStore<WalletSummary>,
    pub app: ValueStore<AppState>,
}

impl WalletSlices {
    /// Slices at their initial values, the app slice seeded from `app`.
    pub fn new(app: AppState) -> Self {
        Self {
            address: ValueStore::new(None),
            network: ValueStore::new(None),
            balance: ValueStore::new(Balance::default()),
            wallet: ValueStore::new(WalletSummary::default()),
            app: ValueStore::new(app),
        }
    }

    /// Current composed snapshot.
    pub fn snapshot(&self) -> WalletState {
        let app = self.app.current();
        WalletState {
            address: self.address.current(),
            network: self.network.current(),
            balance: self.balance.current(),
            wallet: self.wallet.current(),
            mobile_device: app.mobile_device,
        }
    }
}

/// Recompute the composed snapshot whenever any input slice changes.
///
/// The task holds only receivers, so it ends on its own once every slice
/// store is dropped. Changes landing while a recompute is in flight
/// coalesce into the next one.
pub fn spawn_state_task(slices: WalletSlices) -> (watch::Receiver<WalletState>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(slices.snapshot());
    let mut address_rx = slices.address.subscribe();
    let mut network_rx = slices.network.subscribe();
    let mut balance_rx = slices.balance.subscribe();
    let mut wallet_rx = slices.wallet.subscribe();
    let mut app_rx = slices.app.subscribe();
    let task = tokio::spawn(async move {
        loop {
            let changed = tokio::select! {
                changed = address_rx.changed() => changed,
                changed = network_rx.changed() => changed,
                changed = balance_rx.changed() => changed,
                changed = wallet_rx.changed() => changed,
                changed = app_rx.changed() => changed,
            };
            if changed.is_err() {
                break;
            }
            let next = WalletState {
                address: address_rx.borrow_and_update().clone(),
                network: network_rx.borrow_and_update().clone(),
                balance: balance_rx.borrow_and_update().clone(),
                wallet: wallet_rx.borrow_and_update().clone(),
                mobile_device: app_rx.borrow_and_update().mobile_device,
            };
            tx.send_if_modified(|current| {
                if *current == next {
                    return false;
                }
                *current = next;
                true
            });
        }
    });
    (rx, task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_composes_current_slice_values() {
        let slices = WalletSlices::new(AppState {
            mobile_device: true,
            ..AppState::default()
        });
        slices.address.set(Some(Address::from("0xabc")));
        slices.network.set(Some(NetworkId::new(1)));
        slices.balance.set(Balance::new("2.5"));
        slices.wallet.set(WalletSummary::named("metamask"));

        let state = slices.snapshot();
        assert_eq!(state.address, Some(Address::from("0xabc")));
        assert_eq!(state.network, Some(NetworkId::new(1)));
        assert_eq!(state.balance, Balance::new("2.5"));
        assert_eq!(state.wallet.name.as_deref(), Some("metamask"));
        assert!(state.mobile_device);
    }

    #[tokio::test]
    async fn test_state_task_recomputes_on_any_slice_change() {
        let slices = WalletSlices::new(AppState::default());
        let (mut rx, task) = spawn_state_task(slices.clone());

        slices.address.set(Some(Address::from("0xabc")));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().address, Some(Address::from("0xabc")));

        slices.app.update(|app| app.mobile_device = true);
        rx.changed().await.unwrap();
        assert!(rx.borrow().mobile_device);

        task.abort();
    }
}
