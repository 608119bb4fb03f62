use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{RwLock, broadcast, watch};
use tracing::{debug, warn};
use wallet_sync_domain::value_objects::{Address, Balance, NetworkId};
use wallet_sync_provider::syncer::{Syncer, SyncerMode};

use crate::notify::{TransactionNotifier, TxEvent, TxEventKind};
use crate::status::SyncContext;
use crate::store::ValueStore;
use crate::sync::TimedFetch;

/// Shared slot holding the active provider's balance syncer.
pub type SyncerSlot = Arc<RwLock<Option<Syncer<Balance>>>>;

/// Inputs the balance engine's transition function observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceInputs {
    /// Mode of the currently installed balance syncer.
    pub mode: SyncerMode,
    /// Address slice value at decision time.
    pub address: Option<Address>,
    /// Whether the address differs from the one currently tracked.
    pub address_changed: bool,
    /// Whether an address was being tracked before this decision.
    pub was_watching: bool,
}

/// What the balance engine should do after its inputs changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceDecision {
    /// Start a bounded fetch; resubscribe the notifier when the address is
    /// new.
    Fetch { resubscribe: bool },
    /// Clear the slice back to its initial value.
    Reset,
    /// Nothing to do.
    Inert,
}

/// Pure transition logic for the balance engine.
///
/// Push-mode syncers drive the slice themselves, so the engine stays inert
/// while an address is present. Pull-mode syncers fetch while an address is
/// present. Losing a tracked address resets the slice whatever the current
/// mode: during a provider swap the tracker can observe the address reset
/// before or after the new syncer lands in the slot, and the stale balance
/// must go either way.
pub fn decide(inputs: &BalanceInputs) -> BalanceDecision {
    match (inputs.mode, &inputs.address) {
        (SyncerMode::Pull, Some(_)) => BalanceDecision::Fetch {
            resubscribe: inputs.address_changed,
        },
        (_, None) if inputs.was_watching => BalanceDecision::Reset,
        _ => BalanceDecision::Inert,
    }
}

/// Drives the balance slice from address and network changes plus
/// transaction confirmations.
///
/// The tracker only observes; all effects go through [`decide`] so the
/// transition logic stays testable on its own.
pub struct BalanceTracker {
    context: Arc<SyncContext>,
    balance: ValueStore<Balance>,
    syncer_slot: SyncerSlot,
    notifier: Arc<dyn TransactionNotifier>,
    fetch_timeout: Duration,
}

impl BalanceTracker {
    pub fn new(
        context: Arc<SyncContext>,
        balance: ValueStore<Balance>,
        syncer_slot: SyncerSlot,
        notifier: Arc<dyn TransactionNotifier>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            context,
            balance,
            syncer_slot,
            notifier,
            fetch_timeout,
        }
    }

    /// React to slice changes and confirmation events until every input
    /// channel closes.
    pub async fn run(
        self,
        mut address_rx: watch::Receiver<Option<Address>>,
        mut network_rx: watch::Receiver<Option<NetworkId>>,
    ) {
        let mut events: Option<broadcast::Receiver<TxEvent>> = None;
        let mut watched: Option<Address> = None;
        loop {
            tokio::select! {
                changed = address_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = network_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                event = Self::next_event(&mut events) => {
                    match event {
                        Some(event) if event.kind == TxEventKind::Confirmed => {
                            debug!(address = %event.address, tx_hash = %event.tx_hash, "transaction confirmed");
                        }
                        Some(_) => continue,
                        None => {
                            events = None;
                            continue;
                        }
                    }
                }
            }

            let address = address_rx.borrow_and_update().clone();
            let mode = {
                let slot = self.syncer_slot.read().await;
                slot.as_ref().map_or(SyncerMode::Inert, Syncer::mode)
            };
            let inputs = BalanceInputs {
                mode,
                address: address.clone(),
                address_changed: watched.as_ref() != address.as_ref(),
                was_watching: watched.is_some(),
            };
            match decide(&inputs) {
                BalanceDecision::Fetch { resubscribe } => {
                    self.start_fetch().await;
                    if resubscribe && let Some(address) = address {
                        events = self.watch(&address).await;
                        watched = Some(address);
                    }
                }
                BalanceDecision::Reset => {
                    watched = None;
                    events = None;
                    self.context.advance_generation();
                    self.balance.reset();
                    debug!("address cleared, balance reset");
                }
                BalanceDecision::Inert => {}
            }
        }
    }

    async fn next_event(events: &mut Option<broadcast::Receiver<TxEvent>>) -> Option<TxEvent> {
        let Some(rx) = events else {
            return std::future::pending().await;
        };
        loop {
            match rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "transaction event stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    async fn start_fetch(&self) {
        let pull = {
            let slot = self.syncer_slot.read().await;
            slot.as_ref().and_then(Syncer::get)
        };
        let Some(pull) = pull else { return };
        let fetch = TimedFetch {
            context: Arc::clone(&self.context),
            generation: self.context.generation(),
            timeout: self.fetch_timeout,
            apply: self.balance.setter(),
        };
        let handle = fetch.spawn(pull);
        debug!(fetch_id = handle.id(), "balance fetch started");
    }

    async fn watch(&self, address: &Address) -> Option<broadcast::Receiver<TxEvent>> {
        match self.notifier.watch_address(address).await {
            Ok(events) => {
                debug!(address = %address, "watching address for transaction events");
                Some(events)
            }
            Err(error) => {
                warn!(address = %address, error = %error, "transaction watch failed");
                None
            }
        }
    }
}
