//! MessageQueue port - the at-least-once queue the processor consumes.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{LeaseHandle, QueueError};

/// Queue port (interface).
///
/// # Contract
/// - `receive` returns `Ok(None)` when nothing is visible; that is not an error.
/// - A received message stays invisible to other receivers until its
///   visibility window elapses or it is deleted.
/// - `delete` and `renew` fail with `QueueError::LeaseInvalid` when the lease
///   is no longer live.
/// - Serialization of `T` is the queue's job; callers only see typed values.
/// - Implementations are shared between concurrent processors, and `receive`
///   must be cancel-safe: dropping its future before it resolves must not
///   hand out a lease nobody holds.
#[async_trait]
pub trait MessageQueue<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Lease one message for `visibility`, or `None` if the queue is empty.
    async fn receive(&self, visibility: Duration) -> Result<Option<LeaseHandle<T>>, QueueError>;

    /// Append a message.
    async fn enqueue(&self, message: T) -> Result<(), QueueError>;

    /// Remove a message for good. Only valid while the lease is live.
    async fn delete(&self, lease: &LeaseHandle<T>) -> Result<(), QueueError>;

    /// Push the lease deadline out to `now + visibility`.
    async fn renew(&self, lease: &LeaseHandle<T>, visibility: Duration) -> Result<(), QueueError>;
}
