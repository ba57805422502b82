//! Agent entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crewboard_core::types::{RecordId, Timestamp};

/// A row from the `agents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Agent {
    pub id: RecordId,
    pub crew_id: RecordId,
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: Option<String>,
    #[sqlx(json)]
    pub tools: Vec<String>,
    pub max_iterations: i64,
    pub temperature: f64,
    pub model: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for an agent created alongside its crew.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAgent {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    pub max_iterations: Option<i64>,
    pub temperature: Option<f64>,
    pub model: Option<String>,
}
