//! Record-store contract for the execution engine.
//!
//! The engine never touches SQL directly; it reads crews and their members
//! and reads/writes execution records through [`ExecutionStore`]. `save`
//! replaces one record atomically.

use std::collections::HashMap;

use async_trait::async_trait;
use crewboard_core::execution::ExecutionStatus;
use crewboard_core::types::Timestamp;

use crate::error::StoreError;
use crate::models::agent::Agent;
use crate::models::crew::Crew;
use crate::models::execution::{Execution, ExecutionFilter};
use crate::models::task::Task;
use crate::repositories::{AgentRepo, CrewRepo, ExecutionRepo, TaskRepo};
use crate::DbPool;

/// Number of executions per status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionCounts {
    pub by_status: HashMap<ExecutionStatus, i64>,
}

impl ExecutionCounts {
    pub fn get(&self, status: ExecutionStatus) -> i64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Executions that have not reached a terminal status.
    pub fn active(&self) -> i64 {
        self.get(ExecutionStatus::Pending) + self.get(ExecutionStatus::Running)
    }

    pub fn total(&self) -> i64 {
        self.by_status.values().sum()
    }
}

/// Storage operations the execution engine depends on.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Fetch a crew. Fails with `NotFound` for unknown ids.
    async fn get_crew(&self, id: &str) -> Result<Crew, StoreError>;

    /// A crew's agents in creation order (empty for unknown crews).
    async fn get_agents(&self, crew_id: &str) -> Result<Vec<Agent>, StoreError>;

    /// A crew's tasks in creation order (empty for unknown crews).
    async fn get_tasks(&self, crew_id: &str) -> Result<Vec<Task>, StoreError>;

    /// Fetch an execution. Fails with `NotFound` for unknown ids.
    async fn get_execution(&self, id: &str) -> Result<Execution, StoreError>;

    /// List executions matching `filter`, most recent first.
    async fn list_executions(&self, filter: &ExecutionFilter) -> Result<Vec<Execution>, StoreError>;

    /// Insert a new execution record.
    async fn create_execution(&self, execution: &Execution) -> Result<(), StoreError>;

    /// Replace a stored execution. Fails with `NotFound` if it no longer exists.
    async fn save(&self, execution: &Execution) -> Result<(), StoreError>;

    /// Count a run against its crew (`executions` counter, `last_executed`).
    async fn record_crew_run(&self, crew_id: &str, at: Timestamp) -> Result<(), StoreError>;

    /// Execution totals per status.
    async fn execution_counts(&self) -> Result<ExecutionCounts, StoreError>;
}

/// [`ExecutionStore`] backed by the SQLite repositories.
#[derive(Clone)]
pub struct SqlExecutionStore {
    pool: DbPool,
}

impl SqlExecutionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExecutionStore for SqlExecutionStore {
    async fn get_crew(&self, id: &str) -> Result<Crew, StoreError> {
        CrewRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Crew", id))
    }

    async fn get_agents(&self, crew_id: &str) -> Result<Vec<Agent>, StoreError> {
        Ok(AgentRepo::list_by_crew(&self.pool, crew_id).await?)
    }

    async fn get_tasks(&self, crew_id: &str) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_by_crew(&self.pool, crew_id).await?)
    }

    async fn get_execution(&self, id: &str) -> Result<Execution, StoreError> {
        ExecutionRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Execution", id))
    }

    async fn list_executions(&self, filter: &ExecutionFilter) -> Result<Vec<Execution>, StoreError> {
        Ok(ExecutionRepo::list(&self.pool, filter).await?)
    }

    async fn create_execution(&self, execution: &Execution) -> Result<(), StoreError> {
        ExecutionRepo::create(&self.pool, execution).await?;
        Ok(())
    }

    async fn save(&self, execution: &Execution) -> Result<(), StoreError> {
        if ExecutionRepo::save(&self.pool, execution).await? {
            Ok(())
        } else {
            Err(StoreError::not_found("Execution", execution.id.as_str()))
        }
    }

    async fn record_crew_run(&self, crew_id: &str, at: Timestamp) -> Result<(), StoreError> {
        if CrewRepo::record_execution(&self.pool, crew_id, at).await? {
            Ok(())
        } else {
            Err(StoreError::not_found("Crew", crew_id))
        }
    }

    async fn execution_counts(&self) -> Result<ExecutionCounts, StoreError> {
        let rows = ExecutionRepo::count_by_status(&self.pool).await?;
        let mut counts = ExecutionCounts::default();
        for (name, count) in rows {
            match name.parse::<ExecutionStatus>() {
                Ok(status) => {
                    counts.by_status.insert(status, count);
                }
                Err(e) => {
                    tracing::warn!(status = %name, error = %e, "Skipping unknown execution status");
                }
            }
        }
        Ok(counts)
    }
}
