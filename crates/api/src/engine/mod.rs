//! Crew execution engine.
//!
//! - [`machine`] owns one execution's lifecycle: every transition is
//!   persisted through the record store, then published to subscribers.
//! - [`orchestrator`] drives a run through its simulated steps as an
//!   independent task and turns faults into `failed`.
//! - [`supervisor`] accepts start/cancel requests and answers queries.
//! - [`report`] renders the final result text.

pub mod machine;
pub mod orchestrator;
pub mod report;
pub mod supervisor;

use crewboard_core::error::CoreError;
use crewboard_db::StoreError;

pub use machine::{ExecutionMachine, TransitionError};
pub use report::{MarkdownReport, ReportContext, ReportGenerator};
pub use supervisor::ExecutionSupervisor;

/// Error returned by supervisor operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TransitionError> for EngineError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Core(core) => EngineError::Core(core),
            TransitionError::Store(store) => EngineError::Store(store),
            invalid @ TransitionError::Invalid { .. } => {
                EngineError::Core(CoreError::Internal(invalid.to_string()))
            }
        }
    }
}
