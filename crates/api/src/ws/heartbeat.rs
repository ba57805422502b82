use std::sync::Arc;
use std::time::Duration;

use crewboard_events::{BroadcastRouter, Outbound};

/// Spawn a background task that pings every connected client each
/// `interval`.
///
/// Pings go through [`BroadcastRouter::send_to_all`], so a connection whose
/// writer has gone away is deregistered on the next tick. The task runs until
/// the returned handle is aborted during shutdown.
pub fn start_heartbeat(router: Arc<BroadcastRouter>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            let reached = router.send_to_all(Outbound::Ping).await;
            tracing::debug!(reached, "WebSocket heartbeat ping");
        }
    })
}
