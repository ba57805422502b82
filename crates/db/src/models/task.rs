//! Task entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crewboard_core::types::{RecordId, Timestamp};

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: RecordId,
    pub crew_id: RecordId,
    pub name: String,
    pub description: String,
    pub expected_output: String,
    pub assigned_agent: Option<String>,
    pub priority: String,
    pub context: Option<String>,
    pub output_format: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for a task created alongside its crew.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    pub assigned_agent: Option<String>,
    pub priority: Option<String>,
    pub context: Option<String>,
    pub output_format: Option<String>,
}
