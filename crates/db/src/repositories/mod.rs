//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` (or a connection inside a transaction) as the
//! first argument.

pub mod agent_repo;
pub mod crew_repo;
pub mod execution_repo;
pub mod task_repo;

pub use agent_repo::AgentRepo;
pub use crew_repo::CrewRepo;
pub use execution_repo::ExecutionRepo;
pub use task_repo::TaskRepo;

/// Maximum page size for listings.
pub(crate) const MAX_LIMIT: i64 = 500;

/// Default page size for listings.
pub(crate) const DEFAULT_LIMIT: i64 = 100;

/// Clamp user-supplied paging parameters.
pub(crate) fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}
