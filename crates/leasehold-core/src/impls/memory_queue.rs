//! In-memory queue implementation with visibility-timeout leases.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::{LeaseHandle, MessageId, PopReceipt, QueueError};
use crate::observability::QueueCounts;
use crate::ports::MessageQueue;

/// Stored form of one message.
///
/// The body is kept serialized, like a real transport would, so payloads
/// that cannot round-trip surface as transport errors on receive.
#[derive(Debug, Clone)]
struct StoredMessage {
    id: MessageId,
    body: String,
    inserted_at: DateTime<Utc>,
    /// Not receivable before this instant.
    next_visible_at: Instant,
    dequeue_count: u32,
    /// Receipt of the most recent receive, if any.
    receipt: Option<PopReceipt>,
}

impl StoredMessage {
    fn is_visible(&self, now: Instant) -> bool {
        self.next_visible_at <= now
    }

    fn is_leased_by(&self, receipt: PopReceipt, now: Instant) -> bool {
        self.receipt == Some(receipt) && !self.is_visible(now)
    }
}

/// In-memory queue state.
#[derive(Debug, Default)]
struct InMemoryQueueState {
    /// Insertion order; receive scans for the first visible entry.
    messages: VecDeque<StoredMessage>,
}

impl InMemoryQueueState {
    /// Position of the message if `receipt` still holds its lease.
    fn live_lease_position(
        &self,
        message_id: MessageId,
        receipt: PopReceipt,
        now: Instant,
    ) -> Result<usize, QueueError> {
        self.messages
            .iter()
            .position(|m| m.id == message_id && m.is_leased_by(receipt, now))
            .ok_or(QueueError::LeaseInvalid {
                message_id,
                receipt,
            })
    }

    fn counts(&self, now: Instant) -> QueueCounts {
        let mut counts = QueueCounts::default();
        for message in &self.messages {
            if message.is_visible(now) {
                counts.visible += 1;
            } else {
                counts.leased += 1;
            }
        }
        counts
    }
}

/// Deadline `visibility` from `now`, or a transport error if the clock
/// cannot represent it.
fn visible_again_at(
    now: Instant,
    visibility: Duration,
    operation: &'static str,
) -> Result<Instant, QueueError> {
    now.checked_add(visibility).ok_or_else(|| {
        QueueError::transport(operation, format!("visibility {visibility:?} is out of range"))
    })
}

fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

/// In-memory queue implementation.
///
/// Visibility uses `tokio::time::Instant`, so tests running on a paused
/// clock observe lease expiry deterministically.
pub struct InMemoryQueue<T> {
    name: Arc<str>,
    state: Arc<Mutex<InMemoryQueueState>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> InMemoryQueue<T> {
    pub fn new() -> Self {
        Self::named("default")
    }

    /// Queue carrying `name`, typically `ProcessorConfig::queue_name`.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(InMemoryQueueState::default())),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an already-serialized body. No validation happens here;
    /// a body that does not decode as `T` fails the receive that hits it.
    pub async fn enqueue_raw(&self, body: impl Into<String>) -> MessageId {
        let id = MessageId::generate(now_millis());
        let stored = StoredMessage {
            id,
            body: body.into(),
            inserted_at: Utc::now(),
            next_visible_at: Instant::now(),
            dequeue_count: 0,
            receipt: None,
        };
        self.state.lock().await.messages.push_back(stored);
        id
    }

    pub async fn counts(&self) -> QueueCounts {
        self.state.lock().await.counts(Instant::now())
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.messages.is_empty()
    }
}

impl<T> Default for InMemoryQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for InMemoryQueue<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            state: Arc::clone(&self.state),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> MessageQueue<T> for InMemoryQueue<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn receive(&self, visibility: Duration) -> Result<Option<LeaseHandle<T>>, QueueError> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        let Some(stored) = state.messages.iter_mut().find(|m| m.is_visible(now)) else {
            return Ok(None);
        };

        // Decode before touching the record so a bad body is not leased.
        let message: T = serde_json::from_str(&stored.body)
            .map_err(|e| QueueError::transport("receive", format!("decode {}: {e}", stored.id)))?;
        let deadline = visible_again_at(now, visibility, "receive")?;

        let receipt = PopReceipt::generate(now_millis());
        stored.receipt = Some(receipt);
        stored.next_visible_at = deadline;
        stored.dequeue_count += 1;

        Ok(Some(LeaseHandle::new(
            stored.id,
            receipt,
            stored.dequeue_count,
            stored.inserted_at,
            message,
        )))
    }

    async fn enqueue(&self, message: T) -> Result<(), QueueError> {
        let body = serde_json::to_string(&message)
            .map_err(|e| QueueError::transport("enqueue", format!("encode: {e}")))?;
        self.enqueue_raw(body).await;
        Ok(())
    }

    async fn delete(&self, lease: &LeaseHandle<T>) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        let position =
            state.live_lease_position(lease.message_id(), lease.receipt(), Instant::now())?;
        state.messages.remove(position);
        Ok(())
    }

    async fn renew(&self, lease: &LeaseHandle<T>, visibility: Duration) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let position = state.live_lease_position(lease.message_id(), lease.receipt(), now)?;
        state.messages[position].next_visible_at = visible_again_at(now, visibility, "renew")?;
        Ok(())
    }
}
