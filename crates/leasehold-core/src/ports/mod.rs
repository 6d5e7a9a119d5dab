//! Ports - abstractions over the processor's external collaborators.
//!
//! - **MessageQueue**: the at-least-once queue (receive/enqueue/delete/renew)
//! - **LogSink**: structured log entries tagged with a component name
//!
//! Development implementations live in [`crate::impls`].

pub mod log_sink;
pub mod queue;

pub use self::log_sink::{LogEntry, LogLevel, LogSink};
pub use self::queue::MessageQueue;
