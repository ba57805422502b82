//! Handlers for the `/system` resource.
//!
//! Host resource figures are fixed placeholders; execution and connection
//! figures are live.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use crewboard_core::types::Timestamp;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub environment: String,
}

#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub cpu_usage: u8,
    pub memory_usage: u8,
    pub network_usage: u8,
    pub disk_usage: u8,
    /// Stored executions that are `pending` or `running`.
    pub active_executions: i64,
    pub total_executions: i64,
    /// Runs in flight in this process.
    pub running_tasks: usize,
    pub connections: usize,
    pub uptime_secs: i64,
    pub timestamp: Timestamp,
}

/// GET /api/v1/system/info
pub async fn system_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(DataResponse {
        data: SystemInfo {
            name: "Crewboard",
            version: env!("CARGO_PKG_VERSION"),
            status: "healthy",
            environment: state.config.environment.clone(),
        },
    })
}

/// GET /api/v1/system/metrics
pub async fn system_metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let counts = state.supervisor.execution_counts().await?;
    let now = Utc::now();

    Ok(Json(DataResponse {
        data: SystemMetrics {
            cpu_usage: 45,
            memory_usage: 67,
            network_usage: 23,
            disk_usage: 34,
            active_executions: counts.active(),
            total_executions: counts.total(),
            running_tasks: state.supervisor.active_runs().await,
            connections: state.registry.connection_count().await,
            uptime_secs: (now - state.started_at).num_seconds().max(0),
            timestamp: now,
        },
    }))
}
