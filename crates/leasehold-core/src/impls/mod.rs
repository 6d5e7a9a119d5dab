//! Impls - in-process implementations of the ports.
//!
//! - **InMemoryQueue**: development queue with real visibility semantics
//! - **TracingLogSink**: default sink, forwards to `tracing`
//! - **MemoryLogSink**: records entries for inspection
//!
//! Cloud-backed queues belong in their own crates.

pub mod memory_queue;
pub mod memory_sink;
pub mod tracing_sink;

pub use self::memory_queue::InMemoryQueue;
pub use self::memory_sink::MemoryLogSink;
pub use self::tracing_sink::TracingLogSink;
