//! Handlers for the `/executions` resource.
//!
//! Thin wrappers over [`ExecutionSupervisor`](crate::engine::ExecutionSupervisor).

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use crewboard_core::execution::{ExecutionStatus, LogEntry};
use crewboard_db::models::execution::{ExecutionFilter, ExecutionListQuery};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExecutionLogs {
    pub logs: Vec<LogEntry>,
}

/// GET /api/v1/executions
///
/// Most recent first. An unknown `status` is a 400.
pub async fn list_executions(
    State(state): State<AppState>,
    Query(params): Query<ExecutionListQuery>,
) -> AppResult<impl IntoResponse> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<ExecutionStatus>)
        .transpose()?;
    let filter = ExecutionFilter {
        status,
        limit: params.limit,
        offset: params.offset,
    };

    let executions = state.supervisor.get_executions(&filter).await?;
    Ok(Json(DataResponse { data: executions }))
}

/// GET /api/v1/executions/{id}
pub async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let execution = state.supervisor.get_execution(&id).await?;
    Ok(Json(DataResponse { data: execution }))
}

/// GET /api/v1/executions/{id}/logs
pub async fn get_execution_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let logs = state.supervisor.get_execution_logs(&id).await?;
    Ok(Json(DataResponse {
        data: ExecutionLogs { logs },
    }))
}

/// POST /api/v1/executions/{id}/cancel
///
/// Returns the cancelled record; 404 for unknown ids, 409 when the
/// execution has already finished.
pub async fn cancel_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let execution = state.supervisor.cancel_execution(&id).await?;
    Ok(Json(DataResponse { data: execution }))
}
