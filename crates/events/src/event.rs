//! Outbound execution events.
//!
//! Serialized as flat JSON objects tagged by `type`, e.g.
//! `{"type":"log_update","execution_id":"...","log":{...}}`.

use std::sync::Arc;

use crewboard_core::execution::LogEntry;
use crewboard_core::execution_events::{
    MSG_TYPE_EXECUTION_CANCELLED, MSG_TYPE_EXECUTION_COMPLETED, MSG_TYPE_EXECUTION_FAILED,
    MSG_TYPE_EXECUTION_STARTED, MSG_TYPE_LOG_UPDATE,
};
use crewboard_core::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::registry::Outbound;

/// One lifecycle event of an execution, as pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    ExecutionStarted {
        execution_id: RecordId,
        crew_name: String,
        timestamp: Timestamp,
    },
    LogUpdate {
        execution_id: RecordId,
        log: LogEntry,
    },
    ExecutionCompleted {
        execution_id: RecordId,
        result: String,
        /// Milliseconds between `started_at` and `completed_at`.
        duration: i64,
        tokens_used: i64,
        api_calls: i64,
        timestamp: Timestamp,
    },
    ExecutionFailed {
        execution_id: RecordId,
        error: String,
        timestamp: Timestamp,
    },
    ExecutionCancelled {
        execution_id: RecordId,
        timestamp: Timestamp,
    },
}

impl ExecutionEvent {
    /// The execution this event belongs to.
    pub fn execution_id(&self) -> &str {
        match self {
            ExecutionEvent::ExecutionStarted { execution_id, .. }
            | ExecutionEvent::LogUpdate { execution_id, .. }
            | ExecutionEvent::ExecutionCompleted { execution_id, .. }
            | ExecutionEvent::ExecutionFailed { execution_id, .. }
            | ExecutionEvent::ExecutionCancelled { execution_id, .. } => execution_id,
        }
    }

    /// Wire name of the event (its `type` tag).
    pub fn event_type(&self) -> &'static str {
        match self {
            ExecutionEvent::ExecutionStarted { .. } => MSG_TYPE_EXECUTION_STARTED,
            ExecutionEvent::LogUpdate { .. } => MSG_TYPE_LOG_UPDATE,
            ExecutionEvent::ExecutionCompleted { .. } => MSG_TYPE_EXECUTION_COMPLETED,
            ExecutionEvent::ExecutionFailed { .. } => MSG_TYPE_EXECUTION_FAILED,
            ExecutionEvent::ExecutionCancelled { .. } => MSG_TYPE_EXECUTION_CANCELLED,
        }
    }

    /// Whether this is the last event an execution emits.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionEvent::ExecutionCompleted { .. }
                | ExecutionEvent::ExecutionFailed { .. }
                | ExecutionEvent::ExecutionCancelled { .. }
        )
    }

    /// Serialize once into a shareable outbound text frame.
    pub fn to_outbound(&self) -> Result<Outbound, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(Outbound::Text(Arc::from(json)))
    }
}
