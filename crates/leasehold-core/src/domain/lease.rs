//! Lease handle: one in-flight receive of a typed message.

use chrono::{DateTime, Utc};

use super::ids::{MessageId, PopReceipt};

/// A received message together with the queue-native token that proves the
/// receiver currently holds its lease.
///
/// Design:
/// - Created by the queue on receive.
/// - Owned by exactly one processing attempt, then deleted or abandoned.
/// - The payload is exposed as an immutable reference so the handler cannot
///   swap it out from under the error log.
#[derive(Debug, Clone)]
pub struct LeaseHandle<T> {
    message_id: MessageId,
    receipt: PopReceipt,
    dequeue_count: u32,
    inserted_at: DateTime<Utc>,
    message: T,
}

impl<T> LeaseHandle<T> {
    pub fn new(
        message_id: MessageId,
        receipt: PopReceipt,
        dequeue_count: u32,
        inserted_at: DateTime<Utc>,
        message: T,
    ) -> Self {
        Self {
            message_id,
            receipt,
            dequeue_count,
            inserted_at,
            message,
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn receipt(&self) -> PopReceipt {
        self.receipt
    }

    /// Number of times the message has been received, this receive included.
    pub fn dequeue_count(&self) -> u32 {
        self.dequeue_count
    }

    pub fn inserted_at(&self) -> DateTime<Utc> {
        self.inserted_at
    }

    pub fn message(&self) -> &T {
        &self.message
    }
}
