//! Domain model (ids, lease handles, attempt state, errors).

pub mod attempt;
pub mod errors;
pub mod ids;
pub mod lease;

pub use attempt::{AttemptReport, AttemptState};
pub use errors::{HandlerError, QueueError};
pub use ids::{MessageId, PopReceipt};
pub use lease::LeaseHandle;
