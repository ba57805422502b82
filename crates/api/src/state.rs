use std::sync::Arc;

use crewboard_core::types::Timestamp;
use crewboard_events::{BroadcastRouter, ConnectionRegistry};

use crate::config::ServerConfig;
use crate::engine::ExecutionSupervisor;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (crew CRUD).
    pub pool: crewboard_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Live WebSocket connections and their execution subscriptions.
    pub registry: Arc<ConnectionRegistry>,
    /// Event fan-out over `registry`.
    pub router: Arc<BroadcastRouter>,
    /// Execution lifecycle: start, cancel, queries.
    pub supervisor: Arc<ExecutionSupervisor>,
    /// When the process started serving (uptime in system metrics).
    pub started_at: Timestamp,
}
