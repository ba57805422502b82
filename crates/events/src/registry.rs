//! Connection and subscription bookkeeping.
//!
//! [`ConnectionRegistry`] owns two indexes behind one `RwLock` so that a
//! deregistration removes a connection from the live set and from every
//! subscriber set in a single step. A connection absent from the live set is
//! never listed as a subscriber of anything.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};

// ---------------------------------------------------------------------------
// Connection handles
// ---------------------------------------------------------------------------

/// Opaque identity of one live client channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A message queued for one connection's writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Serialized JSON payload. Shared so a broadcast serializes once.
    Text(Arc<str>),
    /// Keep-alive probe.
    Ping,
    /// Ask the writer to close the socket.
    Close,
}

/// Channel sender half for pushing messages to a connection's writer.
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// Channel receiver half drained by a connection's writer.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Outbound>;

/// One connection resolved for delivery. Holds its own sender clone, so it
/// stays usable after the registry lock is released.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub id: ConnectionId,
    sender: OutboundSender,
}

impl Recipient {
    /// Queue `message`. Fails only when the connection's writer has gone away.
    pub fn deliver(&self, message: Outbound) -> Result<(), DeliveryFailure> {
        self.sender
            .send(message)
            .map_err(|_| DeliveryFailure { conn_id: self.id })
    }
}

/// A send to a connection whose channel is closed or broken.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("Delivery to connection {conn_id} failed: channel closed")]
pub struct DeliveryFailure {
    pub conn_id: ConnectionId,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct ConnectionEntry {
    sender: OutboundSender,
    subscriptions: HashSet<String>,
}

#[derive(Default)]
struct Index {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    subscribers: HashMap<String, HashSet<ConnectionId>>,
}

impl Index {
    fn recipient(&self, id: &ConnectionId) -> Option<Recipient> {
        self.connections.get(id).map(|entry| Recipient {
            id: *id,
            sender: entry.sender.clone(),
        })
    }
}

/// Tracks all live connections and their execution subscriptions.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between connection handlers and running executions.
pub struct ConnectionRegistry {
    index: RwLock<Index>,
}

impl ConnectionRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            index: RwLock::new(Index::default()),
        }
    }

    /// Open a channel for a new connection and register it.
    ///
    /// Returns the connection id and the receiver half the caller forwards
    /// to the socket.
    pub async fn connect(&self) -> (ConnectionId, OutboundReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConnectionId::new();
        self.register(id, tx).await;
        (id, rx)
    }

    /// Add a connection to the live set.
    ///
    /// Idempotent: registering an id that is already live keeps the existing
    /// entry (and its subscriptions) and returns `false`.
    pub async fn register(&self, id: ConnectionId, sender: OutboundSender) -> bool {
        let mut index = self.index.write().await;
        if index.connections.contains_key(&id) {
            return false;
        }
        index.connections.insert(
            id,
            ConnectionEntry {
                sender,
                subscriptions: HashSet::new(),
            },
        );
        tracing::debug!(conn_id = %id, total = index.connections.len(), "Connection registered");
        true
    }

    /// Remove a connection from the live set and from every subscriber set.
    ///
    /// Subscriber sets left empty are dropped. Safe to call repeatedly; only
    /// the first call returns `true`.
    pub async fn deregister(&self, id: &ConnectionId) -> bool {
        let mut index = self.index.write().await;
        let Some(entry) = index.connections.remove(id) else {
            return false;
        };
        for execution_id in &entry.subscriptions {
            if let Some(set) = index.subscribers.get_mut(execution_id) {
                set.remove(id);
                if set.is_empty() {
                    index.subscribers.remove(execution_id);
                }
            }
        }
        tracing::debug!(
            conn_id = %id,
            subscriptions = entry.subscriptions.len(),
            total = index.connections.len(),
            "Connection deregistered",
        );
        true
    }

    /// Subscribe a connection to an execution's events.
    ///
    /// Returns `false` (and changes nothing) if the connection is not live.
    pub async fn subscribe(&self, id: &ConnectionId, execution_id: &str) -> bool {
        let mut index = self.index.write().await;
        let Some(entry) = index.connections.get_mut(id) else {
            return false;
        };
        entry.subscriptions.insert(execution_id.to_string());
        index
            .subscribers
            .entry(execution_id.to_string())
            .or_default()
            .insert(*id);
        true
    }

    /// Remove one subscription. Returns `true` if it existed.
    pub async fn unsubscribe(&self, id: &ConnectionId, execution_id: &str) -> bool {
        let mut index = self.index.write().await;
        if let Some(entry) = index.connections.get_mut(id) {
            entry.subscriptions.remove(execution_id);
        }
        let Some(set) = index.subscribers.get_mut(execution_id) else {
            return false;
        };
        let removed = set.remove(id);
        if set.is_empty() {
            index.subscribers.remove(execution_id);
        }
        removed
    }

    /// Snapshot of an execution's current subscribers.
    ///
    /// The returned list is a copy: later registry changes (including
    /// deregistration triggered by a failed send) do not affect it.
    pub async fn subscribers_of(&self, execution_id: &str) -> Vec<Recipient> {
        let index = self.index.read().await;
        index
            .subscribers
            .get(execution_id)
            .map(|set| set.iter().filter_map(|id| index.recipient(id)).collect())
            .unwrap_or_default()
    }

    /// Snapshot of every live connection.
    pub async fn all_connections(&self) -> Vec<Recipient> {
        let index = self.index.read().await;
        index
            .connections
            .keys()
            .filter_map(|id| index.recipient(id))
            .collect()
    }

    /// Resolve a single live connection.
    pub async fn recipient(&self, id: &ConnectionId) -> Option<Recipient> {
        self.index.read().await.recipient(id)
    }

    /// Execution ids a connection is subscribed to.
    pub async fn subscriptions_of(&self, id: &ConnectionId) -> Vec<String> {
        self.index
            .read()
            .await
            .connections
            .get(id)
            .map(|entry| entry.subscriptions.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn is_registered(&self, id: &ConnectionId) -> bool {
        self.index.read().await.connections.contains_key(id)
    }

    /// Number of connections subscribed to an execution.
    pub async fn subscriber_count(&self, execution_id: &str) -> usize {
        self.index
            .read()
            .await
            .subscribers
            .get(execution_id)
            .map_or(0, HashSet::len)
    }

    /// Number of execution ids with at least one subscriber.
    pub async fn subscribed_execution_count(&self) -> usize {
        self.index.read().await.subscribers.len()
    }

    /// Return the current number of live connections.
    pub async fn connection_count(&self) -> usize {
        self.index.read().await.connections.len()
    }

    /// Send a Close to every connection, then clear both indexes.
    ///
    /// Used during graceful shutdown so clients are told before the server
    /// stops.
    pub async fn shutdown_all(&self) {
        let mut index = self.index.write().await;
        let count = index.connections.len();
        for entry in index.connections.values() {
            let _ = entry.sender.send(Outbound::Close);
        }
        index.connections.clear();
        index.subscribers.clear();
        tracing::info!(count, "Closed all client connections");
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
