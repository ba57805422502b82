//! Composition root of the execution engine.
//!
//! [`ExecutionSupervisor`] creates execution records, spawns their runs on a
//! [`TaskTracker`] and keeps the machine of every live run so a cancel
//! request goes through the same machine (and lock) as the run itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crewboard_core::error::CoreError;
use crewboard_core::execution::LogEntry;
use crewboard_db::models::execution::{Execution, ExecutionFilter};
use crewboard_db::{ExecutionCounts, ExecutionStore};
use crewboard_events::BroadcastRouter;
use tokio::sync::{watch, Mutex, RwLock};
use tokio_util::task::TaskTracker;

use crate::config::SimulationConfig;
use crate::engine::machine::ExecutionMachine;
use crate::engine::orchestrator::{self, ExecutionRun, SharedMachine};
use crate::engine::report::ReportGenerator;
use crate::engine::EngineError;

type ActiveRuns = Arc<RwLock<HashMap<String, SharedMachine>>>;

pub struct ExecutionSupervisor {
    store: Arc<dyn ExecutionStore>,
    router: Arc<BroadcastRouter>,
    reports: Arc<dyn ReportGenerator>,
    pacing: SimulationConfig,
    active: ActiveRuns,
    tracker: TaskTracker,
    /// Runs spawned and not yet finished. Separate from the tracker so
    /// waiting for idle never closes it.
    in_flight: Arc<watch::Sender<usize>>,
}

impl ExecutionSupervisor {
    pub fn new(
        store: Arc<dyn ExecutionStore>,
        router: Arc<BroadcastRouter>,
        reports: Arc<dyn ReportGenerator>,
        pacing: SimulationConfig,
    ) -> Self {
        Self {
            store,
            router,
            reports,
            pacing,
            active: Arc::new(RwLock::new(HashMap::new())),
            tracker: TaskTracker::new(),
            in_flight: Arc::new(watch::channel(0).0),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn get_executions(&self, filter: &ExecutionFilter) -> Result<Vec<Execution>, EngineError> {
        Ok(self.store.list_executions(filter).await?)
    }

    pub async fn get_execution(&self, id: &str) -> Result<Execution, EngineError> {
        Ok(self.store.get_execution(id).await?)
    }

    /// The execution's log entries in emission order.
    pub async fn get_execution_logs(&self, id: &str) -> Result<Vec<LogEntry>, EngineError> {
        Ok(self.store.get_execution(id).await?.logs)
    }

    pub async fn execution_counts(&self) -> Result<ExecutionCounts, EngineError> {
        Ok(self.store.execution_counts().await?)
    }

    /// Number of runs currently in flight in this process.
    pub async fn active_runs(&self) -> usize {
        self.active.read().await.len()
    }

    // -----------------------------------------------------------------------
    // Start
    // -----------------------------------------------------------------------

    /// Create a `pending` execution for the crew and start its run in the
    /// background. Returns the record as created; progress is only visible
    /// through events and later queries.
    pub async fn start_execution(&self, crew_id: &str) -> Result<Execution, EngineError> {
        if self.tracker.is_closed() {
            return Err(CoreError::Conflict("Server is shutting down".to_string()).into());
        }
        let crew = self.store.get_crew(crew_id).await?;
        let agents = self.store.get_agents(crew_id).await?;
        let tasks = self.store.get_tasks(crew_id).await?;

        let now = Utc::now();
        let execution = Execution::pending(&crew, now);
        self.store.create_execution(&execution).await?;

        if let Err(e) = self.store.record_crew_run(crew_id, now).await {
            tracing::warn!(crew_id = %crew_id, error = %e, "Could not update crew run counters");
        }

        let machine: SharedMachine = Arc::new(Mutex::new(ExecutionMachine::new(
            execution.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.router),
        )));
        self.active
            .write()
            .await
            .insert(execution.id.clone(), Arc::clone(&machine));

        let run = ExecutionRun {
            machine,
            crew,
            agents,
            tasks,
            reports: Arc::clone(&self.reports),
            pacing: self.pacing,
        };
        let active = Arc::clone(&self.active);
        let execution_id = execution.id.clone();
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.send_modify(|n| *n += 1);
        self.tracker.spawn(async move {
            orchestrator::supervise(run).await;
            active.write().await.remove(&execution_id);
            in_flight.send_modify(|n| *n = n.saturating_sub(1));
        });

        tracing::info!(
            execution_id = %execution.id,
            crew_id = %execution.crew_id,
            "Execution queued",
        );
        Ok(execution)
    }

    // -----------------------------------------------------------------------
    // Cancel
    // -----------------------------------------------------------------------

    /// Cancel a `pending` or `running` execution.
    ///
    /// Fails with `NotFound` for unknown ids and `NotCancellable` for
    /// terminal executions. A live run notices the cancellation at its next
    /// checkpoint. A non-terminal record with no live run in this process is
    /// cancelled directly.
    pub async fn cancel_execution(&self, id: &str) -> Result<Execution, EngineError> {
        let live = self.active.read().await.get(id).cloned();

        let cancelled = match live {
            Some(machine) => machine.lock().await.cancel().await?,
            None => {
                let execution = self.store.get_execution(id).await?;
                if !execution.status.is_cancellable() {
                    return Err(CoreError::NotCancellable {
                        id: execution.id,
                        status: execution.status,
                    }
                    .into());
                }
                tracing::warn!(execution_id = %id, status = %execution.status, "Cancelling orphaned execution");
                ExecutionMachine::new(execution, Arc::clone(&self.store), Arc::clone(&self.router))
                    .cancel()
                    .await?
            }
        };

        tracing::info!(execution_id = %id, "Execution cancelled");
        Ok(cancelled)
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Stop accepting runs and wait up to `timeout` for in-flight ones.
    ///
    /// Returns `true` if every run finished in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let in_flight = self.tracker.len();
        if in_flight > 0 {
            tracing::info!(in_flight, "Waiting for in-flight executions");
        }
        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    remaining = self.tracker.len(),
                    "Shutdown timeout reached with executions still running",
                );
                false
            }
        }
    }

    /// Wait until no run is in flight. Does not affect whether new runs are
    /// accepted.
    pub async fn wait_idle(&self) {
        let mut idle = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = idle.wait_for(|n| *n == 0).await;
    }
}
