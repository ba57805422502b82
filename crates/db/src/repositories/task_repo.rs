//! Repository for the `tasks` table.

use sqlx::{SqliteConnection, SqlitePool};
use crewboard_core::crew::{DEFAULT_OUTPUT_FORMAT, DEFAULT_TASK_PRIORITY};
use crewboard_core::types::Timestamp;

use crate::models::task::{CreateTask, Task};

/// Column list for `tasks` queries.
const COLUMNS: &str = "\
    id, crew_id, name, description, expected_output, assigned_agent, \
    priority, context, output_format, status, created_at, updated_at";

/// Provides CRUD operations for crew tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task for `crew_id` on the given connection.
    pub async fn create(
        conn: &mut SqliteConnection,
        crew_id: &str,
        input: &CreateTask,
        now: Timestamp,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks \
                (id, crew_id, name, description, expected_output, assigned_agent, \
                 priority, context, output_format, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(crew_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.expected_output)
            .bind(&input.assigned_agent)
            .bind(input.priority.as_deref().unwrap_or(DEFAULT_TASK_PRIORITY))
            .bind(&input.context)
            .bind(input.output_format.as_deref().unwrap_or(DEFAULT_OUTPUT_FORMAT))
            .bind(now)
            .fetch_one(&mut *conn)
            .await
    }

    /// List a crew's tasks in creation order.
    pub async fn list_by_crew(pool: &SqlitePool, crew_id: &str) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE crew_id = ?1 ORDER BY rowid");
        sqlx::query_as::<_, Task>(&query)
            .bind(crew_id)
            .fetch_all(pool)
            .await
    }
}
