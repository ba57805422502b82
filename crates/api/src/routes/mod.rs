pub mod crews;
pub mod executions;
pub mod health;
pub mod system;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                   WebSocket (subscribe / unsubscribe)
///
/// /crews                                list, create
/// /crews/import                         recreate from an export (POST)
/// /crews/{id}                           get, update, delete
/// /crews/{id}/agents                    crew agents
/// /crews/{id}/tasks                     crew tasks
/// /crews/{id}/export                    portable crew config
/// /crews/{id}/execute                   start an execution (POST)
///
/// /executions                           list (?status, limit, offset)
/// /executions/{id}                      get
/// /executions/{id}/logs                 log entries
/// /executions/{id}/cancel               cancel (POST)
///
/// /system/info                          service info
/// /system/metrics                       execution + connection metrics
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/crews", crews::router())
        .nest("/executions", executions::router())
        .nest("/system", system::router())
}
