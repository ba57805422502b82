//! Execution lifecycle rules.
//!
//! The transition table lives here so every layer (store, engine, API)
//! agrees on which moves are legal:
//!
//! ```text
//! pending ──► running ──► completed
//!    │           │ ▲ ──► failed
//!    │           └─┘ (progress)
//!    └───────────┴──────► cancelled
//! ```
//!
//! `completed`, `failed` and `cancelled` are terminal.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [ExecutionStatus; 5] = [
        ExecutionStatus::Pending,
        ExecutionStatus::Running,
        ExecutionStatus::Completed,
        ExecutionStatus::Failed,
        ExecutionStatus::Cancelled,
    ];

    /// The stored / wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }

    /// Only `pending` and `running` executions may be cancelled.
    pub fn is_cancellable(self) -> bool {
        matches!(self, ExecutionStatus::Pending | ExecutionStatus::Running)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// `running -> running` is the progress self-loop (log append, counter
    /// accrual).
    pub fn can_transition_to(self, next: ExecutionStatus) -> bool {
        use ExecutionStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Running, Running)
                | (Running, Completed)
                | (Running, Failed)
                | (Pending, Cancelled)
                | (Running, Cancelled)
        )
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExecutionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown execution status: \"{s}\"")))
    }
}

impl TryFrom<String> for ExecutionStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Log entries
// ---------------------------------------------------------------------------

/// Severity of a log entry. Serialized as the entry's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSeverity {
    Info,
    Success,
    Error,
}

/// One line of an execution's log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: Timestamp,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: LogSeverity,
}

impl LogEntry {
    pub fn new(timestamp: Timestamp, message: impl Into<String>, severity: LogSeverity) -> Self {
        Self {
            timestamp,
            message: message.into(),
            severity,
        }
    }
}

/// Pick the timestamp for the next log entry.
///
/// Log timestamps within one execution strictly increase. When the clock
/// has not advanced past the previous entry (coarse clocks, back-to-back
/// appends) the previous timestamp is bumped by one microsecond.
pub fn next_log_timestamp(previous: Option<Timestamp>, now: Timestamp) -> Timestamp {
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

/// Wall-clock duration between two instants in milliseconds, never negative.
pub fn duration_ms(started_at: Timestamp, completed_at: Timestamp) -> i64 {
    (completed_at - started_at).num_milliseconds().max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
