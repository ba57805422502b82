//! Repository for the `crews` table.

use sqlx::SqlitePool;
use crewboard_core::crew::DEFAULT_CREW_STATUS;
use crewboard_core::types::Timestamp;

use super::{page, AgentRepo, TaskRepo};
use crate::models::crew::{CreateCrew, Crew, CrewListQuery, UpdateCrew};

/// Column list for `crews` queries.
const COLUMNS: &str = "\
    id, name, description, status, category, rating, featured, \
    executions, last_executed, created_at, updated_at";

/// Provides CRUD operations for crews.
pub struct CrewRepo;

impl CrewRepo {
    /// Insert a crew together with its agents and tasks in one transaction.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateCrew,
        now: Timestamp,
    ) -> Result<Crew, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO crews (id, name, description, status, category, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
             RETURNING {COLUMNS}"
        );
        let crew = sqlx::query_as::<_, Crew>(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status.as_deref().unwrap_or(DEFAULT_CREW_STATUS))
            .bind(&input.category)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        for agent in &input.agents {
            AgentRepo::create(&mut tx, &crew.id, agent, now).await?;
        }
        for task in &input.tasks {
            TaskRepo::create(&mut tx, &crew.id, task, now).await?;
        }

        tx.commit().await?;
        Ok(crew)
    }

    /// Find a crew by id.
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Crew>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM crews WHERE id = ?1");
        sqlx::query_as::<_, Crew>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List crews, newest first, with optional status/category filters.
    pub async fn list(pool: &SqlitePool, params: &CrewListQuery) -> Result<Vec<Crew>, sqlx::Error> {
        let (limit, offset) = page(params.limit, params.offset);
        let query = format!(
            "SELECT {COLUMNS} FROM crews \
             WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR category = ?2) \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?3 OFFSET ?4"
        );
        sqlx::query_as::<_, Crew>(&query)
            .bind(&params.status)
            .bind(&params.category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if the crew does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        input: &UpdateCrew,
        now: Timestamp,
    ) -> Result<Option<Crew>, sqlx::Error> {
        let query = format!(
            "UPDATE crews SET \
                name = COALESCE(?2, name), \
                description = COALESCE(?3, description), \
                category = COALESCE(?4, category), \
                status = COALESCE(?5, status), \
                updated_at = ?6 \
             WHERE id = ?1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Crew>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.status)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Delete a crew and (by cascade) its agents and tasks.
    ///
    /// Returns `true` if a row was removed. Executions are kept.
    pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM crews WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a new run against the crew. Returns `false` if the crew is gone.
    pub async fn record_execution(
        pool: &SqlitePool,
        id: &str,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE crews SET executions = executions + 1, last_executed = ?2, updated_at = ?2 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
