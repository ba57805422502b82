//! Real-time execution event fan-out.
//!
//! This crate provides the building blocks for pushing execution progress to
//! live client connections:
//!
//! - [`ConnectionRegistry`] — live connections and, per execution id, the
//!   set of connections subscribed to it.
//! - [`BroadcastRouter`] — delivers a message to every subscriber of an
//!   execution (or to every connection) and drops connections whose channel
//!   has gone away.
//! - [`ExecutionEvent`] — the outbound event envelope.
//! - [`ClientMessage`] — inbound subscribe/unsubscribe control messages.

pub mod event;
pub mod protocol;
pub mod registry;
pub mod router;

pub use event::ExecutionEvent;
pub use protocol::ClientMessage;
pub use registry::{ConnectionId, ConnectionRegistry, Outbound, OutboundReceiver, OutboundSender};
pub use router::BroadcastRouter;
