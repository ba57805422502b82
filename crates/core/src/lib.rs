//! Crewboard domain core.
//!
//! Pure types and rules shared by the persistence layer, the real-time
//! fan-out crate and the API server. Nothing in here performs I/O.

pub mod accrual;
pub mod crew;
pub mod error;
pub mod execution;
pub mod execution_events;
pub mod types;
