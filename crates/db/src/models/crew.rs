//! Crew entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crewboard_core::types::{RecordId, Timestamp};

use super::agent::{Agent, CreateAgent};
use super::task::{CreateTask, Task};

/// A row from the `crews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Crew {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub category: Option<String>,
    pub rating: i64,
    pub featured: bool,
    /// Number of executions started for this crew.
    pub executions: i64,
    pub last_executed: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/crews`. Agents and tasks are created with the crew.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCrew {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub agents: Vec<CreateAgent>,
    #[serde(default)]
    pub tasks: Vec<CreateTask>,
}

/// DTO for `PUT /api/v1/crews/{id}`. Only provided fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCrew {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for `GET /api/v1/crews`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    /// Maximum number of results. Defaults to 100, capped at 500.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Portable crew configuration returned by `GET /api/v1/crews/{id}/export`.
#[derive(Debug, Clone, Serialize)]
pub struct CrewExport {
    pub crew: ExportedCrew,
    pub agents: Vec<ExportedAgent>,
    pub tasks: Vec<ExportedTask>,
    pub exported_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedCrew {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedAgent {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: Option<String>,
    pub tools: Vec<String>,
    pub max_iterations: i64,
    pub temperature: f64,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedTask {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    pub assigned_agent: Option<String>,
    pub priority: String,
    pub context: Option<String>,
    pub output_format: String,
}

/// DTO for `POST /api/v1/crews/import`: the shape produced by
/// [`CrewExport`]. `exported_at` and any other extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CrewImport {
    pub crew: ImportedCrew,
    #[serde(default)]
    pub agents: Vec<CreateAgent>,
    #[serde(default)]
    pub tasks: Vec<CreateTask>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportedCrew {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl CrewImport {
    /// The equivalent create request. Ids are assigned on insert.
    pub fn into_create(self) -> CreateCrew {
        CreateCrew {
            name: self.crew.name,
            description: self.crew.description,
            category: self.crew.category,
            status: self.crew.status,
            agents: self.agents,
            tasks: self.tasks,
        }
    }
}

impl CrewExport {
    /// Strip identities and bookkeeping so the crew can be re-imported elsewhere.
    pub fn build(crew: &Crew, agents: &[Agent], tasks: &[Task], exported_at: Timestamp) -> Self {
        Self {
            crew: ExportedCrew {
                name: crew.name.clone(),
                description: crew.description.clone(),
                category: crew.category.clone(),
                status: crew.status.clone(),
            },
            agents: agents
                .iter()
                .map(|a| ExportedAgent {
                    name: a.name.clone(),
                    role: a.role.clone(),
                    goal: a.goal.clone(),
                    backstory: a.backstory.clone(),
                    tools: a.tools.clone(),
                    max_iterations: a.max_iterations,
                    temperature: a.temperature,
                    model: a.model.clone(),
                })
                .collect(),
            tasks: tasks
                .iter()
                .map(|t| ExportedTask {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    expected_output: t.expected_output.clone(),
                    assigned_agent: t.assigned_agent.clone(),
                    priority: t.priority.clone(),
                    context: t.context.clone(),
                    output_format: t.output_format.clone(),
                })
                .collect(),
            exported_at,
        }
    }
}
