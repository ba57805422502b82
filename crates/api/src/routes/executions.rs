//! Route definitions for the `/executions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::executions;
use crate::state::AppState;

/// Routes mounted at `/executions`.
///
/// ```text
/// GET    /                -> list_executions
/// GET    /{id}            -> get_execution
/// GET    /{id}/logs       -> get_execution_logs
/// POST   /{id}/cancel     -> cancel_execution
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(executions::list_executions))
        .route("/{id}", get(executions::get_execution))
        .route("/{id}/logs", get(executions::get_execution_logs))
        .route("/{id}/cancel", post(executions::cancel_execution))
}
