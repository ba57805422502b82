//! Repository for the `executions` table.
//!
//! Status values are always written through `ExecutionStatus::as_str`, never
//! as string literals.

use sqlx::SqlitePool;
use crewboard_core::execution::ExecutionStatus;

use super::page;
use crate::models::execution::{Execution, ExecutionFilter};

/// Column list for `executions` queries.
const COLUMNS: &str = "\
    id, crew_id, crew_name, status, started_at, completed_at, duration, \
    tokens_used, api_calls, result, logs, created_at, updated_at";

/// Provides CRUD operations for executions.
pub struct ExecutionRepo;

impl ExecutionRepo {
    /// Insert a new execution row exactly as given.
    pub async fn create(pool: &SqlitePool, execution: &Execution) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO executions \
                (id, crew_id, crew_name, status, started_at, completed_at, duration, \
                 tokens_used, api_calls, result, logs, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&execution.id)
        .bind(&execution.crew_id)
        .bind(&execution.crew_name)
        .bind(execution.status.as_str())
        .bind(execution.started_at)
        .bind(execution.completed_at)
        .bind(execution.duration)
        .bind(execution.tokens_used)
        .bind(execution.api_calls)
        .bind(&execution.result)
        .bind(sqlx::types::Json(&execution.logs))
        .bind(execution.created_at)
        .bind(execution.updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find an execution by id.
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Execution>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM executions WHERE id = ?1");
        sqlx::query_as::<_, Execution>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List executions, most recently started first.
    pub async fn list(
        pool: &SqlitePool,
        filter: &ExecutionFilter,
    ) -> Result<Vec<Execution>, sqlx::Error> {
        let (limit, offset) = page(filter.limit, filter.offset);
        let query = format!(
            "SELECT {COLUMNS} FROM executions \
             WHERE (?1 IS NULL OR status = ?1) \
             ORDER BY started_at DESC, rowid DESC \
             LIMIT ?2 OFFSET ?3"
        );
        sqlx::query_as::<_, Execution>(&query)
            .bind(filter.status.map(ExecutionStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Overwrite every mutable field of an execution in a single statement.
    ///
    /// Returns `false` if no row with that id exists.
    pub async fn save(pool: &SqlitePool, execution: &Execution) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE executions SET \
                status = ?2, completed_at = ?3, duration = ?4, tokens_used = ?5, \
                api_calls = ?6, result = ?7, logs = ?8, updated_at = ?9 \
             WHERE id = ?1",
        )
        .bind(&execution.id)
        .bind(execution.status.as_str())
        .bind(execution.completed_at)
        .bind(execution.duration)
        .bind(execution.tokens_used)
        .bind(execution.api_calls)
        .bind(&execution.result)
        .bind(sqlx::types::Json(&execution.logs))
        .bind(execution.updated_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of executions per status name.
    pub async fn count_by_status(pool: &SqlitePool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM executions GROUP BY status",
        )
        .fetch_all(pool)
        .await
    }
}
