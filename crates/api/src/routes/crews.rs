//! Route definitions for the `/crews` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::crews;
use crate::state::AppState;

/// Routes mounted at `/crews`.
///
/// ```text
/// GET    /                -> list_crews
/// POST   /                -> create_crew
/// POST   /import          -> import_crew
/// GET    /{id}            -> get_crew
/// PUT    /{id}            -> update_crew
/// DELETE /{id}            -> delete_crew
/// GET    /{id}/agents     -> list_crew_agents
/// GET    /{id}/tasks      -> list_crew_tasks
/// GET    /{id}/export     -> export_crew
/// POST   /{id}/execute    -> execute_crew
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(crews::list_crews).post(crews::create_crew))
        .route("/import", post(crews::import_crew))
        .route(
            "/{id}",
            get(crews::get_crew)
                .put(crews::update_crew)
                .delete(crews::delete_crew),
        )
        .route("/{id}/agents", get(crews::list_crew_agents))
        .route("/{id}/tasks", get(crews::list_crew_tasks))
        .route("/{id}/export", get(crews::export_crew))
        .route("/{id}/execute", post(crews::execute_crew))
}
