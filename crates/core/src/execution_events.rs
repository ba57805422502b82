//! Message type constants for the real-time execution channel.
//!
//! Outbound names are the `type` tag of `crewboard_events::ExecutionEvent`;
//! inbound names are the `type` tag of client control messages.

/// The execution left `pending` and began running.
pub const MSG_TYPE_EXECUTION_STARTED: &str = "execution_started";

/// A log entry was appended to a running execution.
pub const MSG_TYPE_LOG_UPDATE: &str = "log_update";

/// The execution finished successfully.
pub const MSG_TYPE_EXECUTION_COMPLETED: &str = "execution_completed";

/// The execution hit an unhandled fault.
pub const MSG_TYPE_EXECUTION_FAILED: &str = "execution_failed";

/// The execution was cancelled by a user.
pub const MSG_TYPE_EXECUTION_CANCELLED: &str = "execution_cancelled";

/// Client asks to receive events for one execution.
pub const MSG_TYPE_SUBSCRIBE: &str = "subscribe";

/// Client stops receiving events for one execution.
pub const MSG_TYPE_UNSUBSCRIBE: &str = "unsubscribe";
