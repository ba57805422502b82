//! Event fan-out over the connection registry.
//!
//! [`BroadcastRouter`] resolves an audience through a registry snapshot and
//! pushes one message to each member independently. A member whose channel
//! is closed is deregistered; the others still receive the message and the
//! caller never sees the failure.
//!
//! Sends for the same execution id are serialized through a per-execution
//! lane, so every subscriber receives that execution's messages in submission
//! order. Sends for different executions proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::event::ExecutionEvent;
use crate::registry::{ConnectionId, ConnectionRegistry, DeliveryFailure, Outbound, Recipient};

/// Delivers messages to subscribers of an execution, to every connection, or
/// to a single connection.
pub struct BroadcastRouter {
    registry: Arc<ConnectionRegistry>,
    lanes: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BroadcastRouter {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            lanes: Mutex::new(HashMap::new()),
        }
    }

    /// The registry this router delivers through.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Deliver `message` to every current subscriber of `execution_id`.
    ///
    /// Returns the number of successful deliveries.
    pub async fn send_to_execution(&self, execution_id: &str, message: Outbound) -> usize {
        let lane = self.lane(execution_id).await;
        let _ordered = lane.lock().await;
        let recipients = self.registry.subscribers_of(execution_id).await;
        self.deliver(recipients, message).await
    }

    /// Deliver `message` to every live connection.
    pub async fn send_to_all(&self, message: Outbound) -> usize {
        let recipients = self.registry.all_connections().await;
        self.deliver(recipients, message).await
    }

    /// Deliver `message` to one connection. Returns `false` if the connection
    /// is unknown or its channel is closed (it is deregistered in that case).
    pub async fn send_to_one(&self, conn_id: &ConnectionId, message: Outbound) -> bool {
        match self.registry.recipient(conn_id).await {
            Some(recipient) => self.deliver(vec![recipient], message).await == 1,
            None => false,
        }
    }

    /// Serialize an execution event and deliver it to the execution's
    /// subscribers. The lane is retired after a terminal event.
    pub async fn publish(&self, event: &ExecutionEvent) -> usize {
        let execution_id = event.execution_id();
        let delivered = match event.to_outbound() {
            Ok(message) => self.send_to_execution(execution_id, message).await,
            Err(e) => {
                tracing::error!(
                    execution_id = %execution_id,
                    event_type = event.event_type(),
                    error = %e,
                    "Failed to serialize execution event",
                );
                0
            }
        };
        tracing::debug!(
            execution_id = %execution_id,
            event_type = event.event_type(),
            delivered,
            "Published execution event",
        );
        if event.is_terminal() {
            self.retire(execution_id).await;
        }
        delivered
    }

    /// Forget the ordering lane of an execution that will emit nothing more.
    pub async fn retire(&self, execution_id: &str) {
        self.lanes.lock().await.remove(execution_id);
    }

    /// Number of executions with an ordering lane.
    pub async fn lane_count(&self) -> usize {
        self.lanes.lock().await.len()
    }

    async fn lane(&self, execution_id: &str) -> Arc<Mutex<()>> {
        let mut lanes = self.lanes.lock().await;
        Arc::clone(lanes.entry(execution_id.to_string()).or_default())
    }

    async fn deliver(&self, recipients: Vec<Recipient>, message: Outbound) -> usize {
        let mut delivered = 0;
        let mut failures: Vec<DeliveryFailure> = Vec::new();

        for recipient in &recipients {
            match recipient.deliver(message.clone()) {
                Ok(()) => delivered += 1,
                Err(failure) => failures.push(failure),
            }
        }

        for failure in failures {
            tracing::warn!(conn_id = %failure.conn_id, error = %failure, "Dropping unreachable connection");
            self.registry.deregister(&failure.conn_id).await;
        }

        delivered
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
