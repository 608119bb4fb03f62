use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::debug;
use wallet_sync_domain::value_objects::Address;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Kinds of transaction events a notifier can emit.
///
/// The balance engine reacts to `Confirmed` and ignores the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxEventKind {
    /// Transaction was submitted and awaits confirmation.
    Pending,
    /// Transaction was confirmed on chain.
    Confirmed,
    /// Transaction failed on chain.
    Failed,
    /// Transaction was dropped before confirmation.
    Cancelled,
}

/// One transaction event scoped to a watched address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEvent {
    /// Event ID.
    pub id: String,
    /// Address the transaction touches.
    pub address: Address,
    /// What happened to the transaction.
    pub kind: TxEventKind,
    /// Transaction hash.
    pub tx_hash: String,
    /// When the event was produced.
    pub timestamp: DateTime<Utc>,
}

impl TxEvent {
    /// Event with a fresh id and the current timestamp.
    pub fn new(address: Address, kind: TxEventKind, tx_hash: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            address,
            kind,
            tx_hash: tx_hash.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Source of transaction events keyed by address.
///
/// The engine only needs subscribe-by-address; where the events come from
/// is the implementor's concern.
#[async_trait]
pub trait TransactionNotifier: Send + Sync {
    /// Subscribe to events for `address`.
    async fn watch_address(&self, address: &Address) -> anyhow::Result<broadcast::Receiver<TxEvent>>;
}

/// In-memory notifier with one broadcast channel per address.
///
/// The engine's default event source; also the one tests drive directly.
#[derive(Default)]
pub struct InMemoryNotifier {
    channels: RwLock<HashMap<Address, broadcast::Sender<TxEvent>>>,
    subscriptions: AtomicUsize,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total `watch_address` calls so far.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Number of addresses currently holding a channel.
    pub async fn watched_addresses(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Emit `event` to watchers of its address. Returns how many receivers
    /// got it.
    pub async fn emit(&self, event: TxEvent) -> usize {
        let address = event.address.clone();
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&address) {
                Some(sender) => {
                    debug!(address = %address, kind = ?event.kind, "transaction event emitted");
                    sender.send(event).unwrap_or(0)
                }
                None => return 0,
            }
        };
        if delivered == 0 {
            self.evict_if_unwatched(&address).await;
        }
        delivered
    }

    /// Drop the channel for `address` if its last watcher is gone. Rechecks
    /// under the write lock in case a new watcher arrived in between.
    async fn evict_if_unwatched(&self, address: &Address) {
        let mut channels = self.channels.write().await;
        if channels
            .get(address)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(address);
            debug!(address = %address, "unwatched address channel dropped");
        }
    }

    /// Emit a confirmed event for `address`.
    pub async fn confirm(&self, address: &Address, tx_hash: &str) -> usize {
        self.emit(TxEvent::new(address.clone(), TxEventKind::Confirmed, tx_hash))
            .await
    }
}

#[async_trait]
impl TransactionNotifier for InMemoryNotifier {
    async fn watch_address(&self, address: &Address) -> anyhow::Result<broadcast::Receiver<TxEvent>> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(address.clone())
            .or_insert_with(|| broadcast::channel(EVENT_CHANNEL_CAPACITY).0);
        Ok(sender.subscribe())
    }
}
