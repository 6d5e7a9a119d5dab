//! leasehold-core
//!
//! Lease-based message processing on top of an at-least-once queue.
//!
//! # Modules
//! - **domain**: lease handles, ids, attempt state, errors
//! - **ports**: `MessageQueue` and `LogSink` traits
//! - **app**: poll loop, lifecycle coordinator, renewal guard, builder, group
//! - **impls**: in-memory queue and log sinks
//! - **config**: processor configuration (file + environment)
//! - **observability**: queue and processor counters
//!
//! A message is deleted only after its handler succeeds. While the handler
//! runs, its lease is renewed every half window. Failed messages are left to
//! reappear when the lease expires.

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

#[cfg(test)]
mod testing;

pub use app::{
    MessageHandler, ProcessorBuilder, ProcessorError, ProcessorGroup, QueueProcessor,
    ShutdownSignal, ShutdownTrigger, handler_fn, shutdown,
};
pub use config::ProcessorConfig;
pub use domain::{HandlerError, LeaseHandle, QueueError};
pub use ports::{LogSink, MessageQueue};
