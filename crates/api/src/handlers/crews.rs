//! Handlers for the `/crews` resource.
//!
//! Crew, agent and task records are plain CRUD over the repositories;
//! `execute_crew` hands off to the execution supervisor.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use crewboard_core::crew::{
    validate_agent, validate_crew_details, validate_crew_name, validate_crew_status,
    validate_task,
};
use crewboard_core::error::CoreError;
use crewboard_db::models::crew::{
    CreateCrew, Crew, CrewExport, CrewImport, CrewListQuery, UpdateCrew,
};
use crewboard_db::repositories::{AgentRepo, CrewRepo, TaskRepo};
use crewboard_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_crew(pool: &DbPool, id: &str) -> AppResult<Crew> {
    CrewRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Crew",
                id: id.to_string(),
            })
        })
}

fn validate_create(input: &CreateCrew) -> Result<(), CoreError> {
    validate_crew_name(&input.name)?;
    validate_crew_details(input.description.as_deref(), input.category.as_deref())?;
    if let Some(status) = &input.status {
        validate_crew_status(status)?;
    }
    for agent in &input.agents {
        validate_agent(
            &agent.name,
            &agent.role,
            &agent.goal,
            agent.temperature,
            agent.max_iterations,
        )?;
    }
    for task in &input.tasks {
        validate_task(
            &task.name,
            &task.description,
            &task.expected_output,
            task.priority.as_deref(),
        )?;
    }
    Ok(())
}

fn validate_update(input: &UpdateCrew) -> Result<(), CoreError> {
    if let Some(name) = &input.name {
        validate_crew_name(name)?;
    }
    validate_crew_details(input.description.as_deref(), input.category.as_deref())?;
    if let Some(status) = &input.status {
        validate_crew_status(status)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/crews
///
/// Supports optional `status`, `category`, `limit` and `offset` query
/// parameters.
pub async fn list_crews(
    State(state): State<AppState>,
    Query(params): Query<CrewListQuery>,
) -> AppResult<impl IntoResponse> {
    let crews = CrewRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: crews }))
}

/// POST /api/v1/crews
///
/// Create a crew together with its agents and tasks. Returns 201.
pub async fn create_crew(
    State(state): State<AppState>,
    Json(input): Json<CreateCrew>,
) -> AppResult<impl IntoResponse> {
    validate_create(&input)?;

    let crew = CrewRepo::create(&state.pool, &input, Utc::now()).await?;

    tracing::info!(
        crew_id = %crew.id,
        agents = input.agents.len(),
        tasks = input.tasks.len(),
        "Crew created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: crew })))
}

/// GET /api/v1/crews/{id}
pub async fn get_crew(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let crew = find_crew(&state.pool, &id).await?;
    Ok(Json(DataResponse { data: crew }))
}

/// PUT /api/v1/crews/{id}
///
/// Partial update: only fields present in the body change.
pub async fn update_crew(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCrew>,
) -> AppResult<impl IntoResponse> {
    validate_update(&input)?;

    let crew = CrewRepo::update(&state.pool, &id, &input, Utc::now())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Crew", id }))?;

    Ok(Json(DataResponse { data: crew }))
}

/// DELETE /api/v1/crews/{id}
///
/// Removes the crew with its agents and tasks. Returns 204. Executions are
/// kept as history.
pub async fn delete_crew(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !CrewRepo::delete(&state.pool, &id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Crew", id }));
    }
    tracing::info!(crew_id = %id, "Crew deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// GET /api/v1/crews/{id}/agents
pub async fn list_crew_agents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    find_crew(&state.pool, &id).await?;
    let agents = AgentRepo::list_by_crew(&state.pool, &id).await?;
    Ok(Json(DataResponse { data: agents }))
}

/// GET /api/v1/crews/{id}/tasks
pub async fn list_crew_tasks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    find_crew(&state.pool, &id).await?;
    let tasks = TaskRepo::list_by_crew(&state.pool, &id).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/crews/{id}/export
pub async fn export_crew(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let crew = find_crew(&state.pool, &id).await?;
    let agents = AgentRepo::list_by_crew(&state.pool, &id).await?;
    let tasks = TaskRepo::list_by_crew(&state.pool, &id).await?;

    let export = CrewExport::build(&crew, &agents, &tasks, Utc::now());
    Ok(Json(DataResponse { data: export }))
}

/// POST /api/v1/crews/import
///
/// Recreate a crew from an export. The crew, its agents and its tasks all
/// get fresh ids. Returns 201.
pub async fn import_crew(
    State(state): State<AppState>,
    Json(input): Json<CrewImport>,
) -> AppResult<impl IntoResponse> {
    let input = input.into_create();
    validate_create(&input)?;

    let crew = CrewRepo::create(&state.pool, &input, Utc::now()).await?;

    tracing::info!(
        crew_id = %crew.id,
        agents = input.agents.len(),
        tasks = input.tasks.len(),
        "Crew imported",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: crew })))
}

// ---------------------------------------------------------------------------
// Execute
// ---------------------------------------------------------------------------

/// POST /api/v1/crews/{id}/execute
///
/// Start an execution. Returns 202 with the `pending` record; progress is
/// delivered over the WebSocket to subscribers of the execution id.
pub async fn execute_crew(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let execution = state.supervisor.start_execution(&id).await?;
    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: execution })))
}
