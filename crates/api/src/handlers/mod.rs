pub mod crews;
pub mod executions;
pub mod system;
