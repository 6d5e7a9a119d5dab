//! Strongly-typed identifiers for queue messages and their receipts.
//!
//! Both are ULIDs underneath. `Id<T>` carries a zero-sized marker so a
//! `MessageId` can never be passed where a `PopReceipt` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait providing the display prefix of an id type.
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic ULID-backed id.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// Build an id from a millisecond timestamp plus random bits.
    ///
    /// Ids generated within the same millisecond are not ordered.
    pub fn generate(timestamp_ms: u64) -> Self {
        Self::from_ulid(Ulid::from_parts(timestamp_ms, rand::random()))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Message {}

impl IdMarker for Message {
    fn prefix() -> &'static str {
        "msg-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Receipt {}

impl IdMarker for Receipt {
    fn prefix() -> &'static str {
        "rcpt-"
    }
}

/// Identity of a message for its whole life in the queue.
pub type MessageId = Id<Message>;

/// Token for one receive of a message. A new receipt is issued every time
/// the message is received, so a stale receipt cannot touch a newer lease.
pub type PopReceipt = Id<Receipt>;
