use axum::routing::get;
use axum::Router;

use crate::handlers::system;
use crate::state::AppState;

/// Routes mounted at `/system`.
///
/// ```text
/// GET    /info            -> system_info
/// GET    /metrics         -> system_metrics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/info", get(system::system_info))
        .route("/metrics", get(system::system_metrics))
}
