use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use crewboard_events::{ClientMessage, ConnectionRegistry, Outbound};
use futures::{SinkExt, StreamExt};

use crate::state::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with the
/// [`ConnectionRegistry`] and served by a writer task plus a reader loop.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.registry))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection and obtains its outbound channel.
///   2. Spawns a writer task that forwards the channel to the sink.
///   3. Applies inbound subscribe/unsubscribe messages on the current task.
///   4. Deregisters on disconnect, which drops every subscription.
async fn handle_socket(socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let (conn_id, mut rx) = registry.connect().await;
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    let writer_conn_id = conn_id;
    let send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let closing = outbound == Outbound::Close;
            let frame = match outbound {
                Outbound::Text(text) => Message::Text(text.as_ref().into()),
                Outbound::Ping => Message::Ping(Bytes::new()),
                Outbound::Close => Message::Close(None),
            };
            if sink.send(frame).await.is_err() {
                tracing::debug!(conn_id = %writer_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match ClientMessage::parse(text.as_str()) {
                Ok(message) => message.apply(&registry, &conn_id).await,
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Ignoring malformed client message");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    registry.deregister(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
