//! App - the processing engine built on the ports.
//!
//! # Components
//! - **QueueProcessor**: the poll loop (receive, dispatch, idle back-off)
//! - **lifecycle**: one message through handler + renewal to delete/abandon
//! - **RenewalGuard**: keeps a lease alive while its handler runs
//! - **ProcessorBuilder**: wiring and config validation
//! - **ProcessorGroup**: several processors on one queue
//! - **shutdown**: cooperative cancellation

pub mod builder;
pub mod group;
pub mod handler;
pub mod lifecycle;
pub mod processor;
pub mod renewal;
pub mod shutdown;

pub use self::builder::{BuildError, ProcessorBuilder};
pub use self::group::ProcessorGroup;
pub use self::handler::{FnHandler, MessageHandler, handler_fn};
pub use self::processor::{ProcessorError, QueueProcessor};
pub use self::renewal::{RenewalGuard, RenewalSummary, renewal_interval};
pub use self::shutdown::{ShutdownSignal, ShutdownTrigger};
