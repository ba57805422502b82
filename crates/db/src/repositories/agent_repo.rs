//! Repository for the `agents` table.

use sqlx::{SqliteConnection, SqlitePool};
use crewboard_core::crew::{DEFAULT_AGENT_MODEL, DEFAULT_MAX_ITERATIONS, DEFAULT_TEMPERATURE};
use crewboard_core::types::Timestamp;

use crate::models::agent::{Agent, CreateAgent};

/// Column list for `agents` queries.
const COLUMNS: &str = "\
    id, crew_id, name, role, goal, backstory, tools, max_iterations, \
    temperature, model, status, created_at, updated_at";

/// Provides CRUD operations for crew agents.
pub struct AgentRepo;

impl AgentRepo {
    /// Insert an agent for `crew_id`. Runs on a connection so crew creation
    /// can insert members inside its transaction.
    pub async fn create(
        conn: &mut SqliteConnection,
        crew_id: &str,
        input: &CreateAgent,
        now: Timestamp,
    ) -> Result<Agent, sqlx::Error> {
        let query = format!(
            "INSERT INTO agents \
                (id, crew_id, name, role, goal, backstory, tools, max_iterations, \
                 temperature, model, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agent>(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(crew_id)
            .bind(&input.name)
            .bind(&input.role)
            .bind(&input.goal)
            .bind(&input.backstory)
            .bind(sqlx::types::Json(&input.tools))
            .bind(input.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS))
            .bind(input.temperature.unwrap_or(DEFAULT_TEMPERATURE))
            .bind(input.model.as_deref().unwrap_or(DEFAULT_AGENT_MODEL))
            .bind(now)
            .fetch_one(&mut *conn)
            .await
    }

    /// List a crew's agents in creation order.
    pub async fn list_by_crew(pool: &SqlitePool, crew_id: &str) -> Result<Vec<Agent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agents WHERE crew_id = ?1 ORDER BY rowid");
        sqlx::query_as::<_, Agent>(&query)
            .bind(crew_id)
            .fetch_all(pool)
            .await
    }
}
