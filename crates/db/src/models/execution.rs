//! Execution entity model (one run of a crew).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crewboard_core::execution::{ExecutionStatus, LogEntry};
use crewboard_core::types::{RecordId, Timestamp};

use super::crew::Crew;

/// A row from the `executions` table.
///
/// `completed_at` and `duration` are set exactly when `status` is terminal.
/// `logs` is append-only while the run is live.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Execution {
    pub id: RecordId,
    pub crew_id: RecordId,
    /// Crew name snapshot taken when the execution was created.
    pub crew_name: String,
    #[sqlx(try_from = "String")]
    pub status: ExecutionStatus,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    /// Wall-clock run time in milliseconds.
    pub duration: Option<i64>,
    pub tokens_used: i64,
    pub api_calls: i64,
    pub result: Option<String>,
    #[sqlx(json)]
    pub logs: Vec<LogEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Execution {
    /// A fresh `pending` execution for `crew`, stamped with `now`.
    pub fn pending(crew: &Crew, now: Timestamp) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            crew_id: crew.id.clone(),
            crew_name: crew.name.clone(),
            status: ExecutionStatus::Pending,
            started_at: now,
            completed_at: None,
            duration: None,
            tokens_used: 0,
            api_calls: 0,
            result: None,
            logs: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Query parameters for `GET /api/v1/executions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionListQuery {
    /// Filter by status name (e.g. `running`).
    pub status: Option<String>,
    /// Maximum number of results. Defaults to 100, capped at 500.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Resolved execution listing filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionFilter {
    pub status: Option<ExecutionStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
