//! Lifecycle of one execution.
//!
//! [`ExecutionMachine`] holds the authoritative in-memory copy of an
//! execution while it is live. Each transition builds the next record,
//! persists it with [`ExecutionStore::save`], adopts it, and only then hands
//! the matching event to the [`BroadcastRouter`]. A client that queries the
//! record after receiving an event therefore never sees an older state.
//!
//! The machine is shared behind a `tokio::sync::Mutex`; holding that lock
//! across persist + publish is what keeps an execution's events in order.

use std::sync::Arc;

use chrono::Utc;
use crewboard_core::accrual::Accrual;
use crewboard_core::error::CoreError;
use crewboard_core::execution::{
    duration_ms, next_log_timestamp, ExecutionStatus, LogEntry, LogSeverity,
};
use crewboard_core::types::Timestamp;
use crewboard_db::models::execution::Execution;
use crewboard_db::{ExecutionStore, StoreError};
use crewboard_events::{BroadcastRouter, ExecutionEvent};

/// A transition the machine refused or could not persist.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// The move is not in the transition table. A caller logic error.
    #[error("Illegal execution transition {from} -> {to}")]
    Invalid {
        from: ExecutionStatus,
        to: ExecutionStatus,
    },

    /// A user-facing rejection such as `NotCancellable`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ExecutionMachine {
    execution: Execution,
    store: Arc<dyn ExecutionStore>,
    router: Arc<BroadcastRouter>,
}

impl ExecutionMachine {
    pub fn new(
        execution: Execution,
        store: Arc<dyn ExecutionStore>,
        router: Arc<BroadcastRouter>,
    ) -> Self {
        Self {
            execution,
            store,
            router,
        }
    }

    pub fn execution(&self) -> &Execution {
        &self.execution
    }

    pub fn status(&self) -> ExecutionStatus {
        self.execution.status
    }

    pub fn id(&self) -> &str {
        &self.execution.id
    }

    /// `pending -> running`. Emits `execution_started`.
    pub async fn begin(&mut self) -> Result<(), TransitionError> {
        self.check(ExecutionStatus::Running)?;
        let now = Utc::now();

        let mut next = self.execution.clone();
        next.status = ExecutionStatus::Running;
        next.updated_at = now;

        let event = ExecutionEvent::ExecutionStarted {
            execution_id: next.id.clone(),
            crew_name: next.crew_name.clone(),
            timestamp: now,
        };
        self.commit(next, event).await
    }

    /// `running -> running`: append a log entry and add `accrual` to the
    /// counters. Emits `log_update` carrying the new entry.
    pub async fn progress(
        &mut self,
        message: impl Into<String>,
        severity: LogSeverity,
        accrual: Accrual,
    ) -> Result<LogEntry, TransitionError> {
        self.check(ExecutionStatus::Running)?;
        let now = Utc::now();
        let timestamp = next_log_timestamp(self.execution.logs.last().map(|l| l.timestamp), now);
        let entry = LogEntry::new(timestamp, message, severity);

        let mut next = self.execution.clone();
        next.logs.push(entry.clone());
        next.tokens_used += accrual.tokens;
        next.api_calls += accrual.api_calls;
        next.updated_at = now;

        let event = ExecutionEvent::LogUpdate {
            execution_id: next.id.clone(),
            log: entry.clone(),
        };
        self.commit(next, event).await?;
        Ok(entry)
    }

    /// `running -> completed` at `now`, adding the last step's `accrual`.
    /// Emits `execution_completed` with the final metrics.
    pub async fn complete(
        &mut self,
        result: String,
        accrual: Accrual,
        now: Timestamp,
    ) -> Result<(), TransitionError> {
        self.check(ExecutionStatus::Completed)?;

        let mut next = self.execution.clone();
        next.status = ExecutionStatus::Completed;
        next.result = Some(result.clone());
        next.tokens_used += accrual.tokens;
        next.api_calls += accrual.api_calls;
        finish(&mut next, now);

        let event = ExecutionEvent::ExecutionCompleted {
            execution_id: next.id.clone(),
            result,
            duration: next.duration.unwrap_or_default(),
            tokens_used: next.tokens_used,
            api_calls: next.api_calls,
            timestamp: now,
        };
        self.commit(next, event).await
    }

    /// `{pending, running} -> cancelled`. Emits `execution_cancelled`.
    ///
    /// Fails with [`CoreError::NotCancellable`] (state untouched) when the
    /// execution is already terminal.
    pub async fn cancel(&mut self) -> Result<Execution, TransitionError> {
        if !self.status().is_cancellable() {
            return Err(CoreError::NotCancellable {
                id: self.execution.id.clone(),
                status: self.status(),
            }
            .into());
        }
        let now = Utc::now();

        let mut next = self.execution.clone();
        next.status = ExecutionStatus::Cancelled;
        finish(&mut next, now);

        let event = ExecutionEvent::ExecutionCancelled {
            execution_id: next.id.clone(),
            timestamp: now,
        };
        self.commit(next, event).await?;
        Ok(self.execution.clone())
    }

    /// `running -> failed`. Emits `execution_failed` carrying `error`.
    ///
    /// This is the fault path, so persistence is best effort: when the record
    /// can no longer be saved (it may be the fault itself) the machine still
    /// adopts the failed state and notifies subscribers. A fault that struck
    /// before the run began passes through `running` without an event.
    pub async fn fail(&mut self, error: &str) -> Result<(), TransitionError> {
        let now = Utc::now();
        let mut next = self.execution.clone();
        if next.status == ExecutionStatus::Pending {
            next.status = ExecutionStatus::Running;
        }
        if !next.status.can_transition_to(ExecutionStatus::Failed) {
            return Err(TransitionError::Invalid {
                from: self.status(),
                to: ExecutionStatus::Failed,
            });
        }

        next.status = ExecutionStatus::Failed;
        finish(&mut next, now);

        if let Err(e) = self.store.save(&next).await {
            tracing::warn!(
                execution_id = %next.id,
                error = %e,
                "Could not persist failed execution",
            );
        }
        self.execution = next;

        let event = ExecutionEvent::ExecutionFailed {
            execution_id: self.execution.id.clone(),
            error: error.to_string(),
            timestamp: now,
        };
        self.router.publish(&event).await;
        Ok(())
    }

    fn check(&self, to: ExecutionStatus) -> Result<(), TransitionError> {
        let from = self.status();
        if from.can_transition_to(to) {
            Ok(())
        } else {
            Err(TransitionError::Invalid { from, to })
        }
    }

    async fn commit(&mut self, next: Execution, event: ExecutionEvent) -> Result<(), TransitionError> {
        self.store.save(&next).await?;
        self.execution = next;
        self.router.publish(&event).await;
        Ok(())
    }
}

/// Stamp the terminal timestamps.
fn finish(execution: &mut Execution, now: Timestamp) {
    execution.completed_at = Some(now);
    execution.duration = Some(duration_ms(execution.started_at, now));
    execution.updated_at = now;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
