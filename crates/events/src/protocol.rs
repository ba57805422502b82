//! Inbound control messages sent by real-time clients.

use serde::Deserialize;

use crate::registry::{ConnectionId, ConnectionRegistry};

/// A client request to change its execution subscriptions.
///
/// ```json
/// {"type": "subscribe", "execution_id": "..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe { execution_id: String },
    Unsubscribe { execution_id: String },
}

impl ClientMessage {
    /// Parse one inbound text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Apply the message to the registry on behalf of `conn_id`.
    pub async fn apply(self, registry: &ConnectionRegistry, conn_id: &ConnectionId) {
        match self {
            ClientMessage::Subscribe { execution_id } => {
                if registry.subscribe(conn_id, &execution_id).await {
                    tracing::debug!(conn_id = %conn_id, execution_id = %execution_id, "Subscribed");
                } else {
                    tracing::debug!(
                        conn_id = %conn_id,
                        execution_id = %execution_id,
                        "Subscribe ignored for unregistered connection",
                    );
                }
            }
            ClientMessage::Unsubscribe { execution_id } => {
                registry.unsubscribe(conn_id, &execution_id).await;
                tracing::debug!(conn_id = %conn_id, execution_id = %execution_id, "Unsubscribed");
            }
        }
    }
}
