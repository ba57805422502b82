//! WebSocket infrastructure for real-time execution updates.
//!
//! Provides the HTTP upgrade handler used by Axum routes and the heartbeat
//! task. Connection bookkeeping and fan-out live in `crewboard_events`.

mod handler;
mod heartbeat;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
