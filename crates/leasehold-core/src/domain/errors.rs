//! Error taxonomy for queue operations and caller-supplied handlers.

use std::error::Error as StdError;

use thiserror::Error;

use super::ids::{MessageId, PopReceipt};

/// Errors surfaced by a [`MessageQueue`](crate::ports::MessageQueue).
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue could not be reached, or a payload could not be
    /// (de)serialized.
    #[error("queue transport failed during {operation}: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    /// Renew or delete against a lease the queue no longer recognises
    /// (expired, already deleted, or never issued).
    #[error("lease for {message_id} ({receipt}) is no longer valid")]
    LeaseInvalid {
        message_id: MessageId,
        receipt: PopReceipt,
    },
}

impl QueueError {
    pub fn transport(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            reason: reason.into(),
        }
    }

    pub fn is_lease_invalid(&self) -> bool {
        matches!(self, Self::LeaseInvalid { .. })
    }
}

/// Failure raised by caller-supplied processing logic.
///
/// Always contained by the lifecycle coordinator: the message is left to
/// expire and the failure is logged together with the payload.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap any error, keeping it reachable through `source()`.
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn handler_error_keeps_source() {
        let io = std::io::Error::other("disk on fire");
        let err = HandlerError::from_error(io);

        assert_eq!(err.to_string(), "disk on fire");
        assert!(err.source().is_some());
    }

    #[test]
    fn handler_error_from_str_has_no_source() {
        let err: HandlerError = "boom".into();
        assert_eq!(err.message(), "boom");
        assert!(err.source().is_none());
    }

    #[test]
    fn lease_invalid_is_classified() {
        let err = QueueError::LeaseInvalid {
            message_id: MessageId::from_ulid(Ulid::new()),
            receipt: PopReceipt::from_ulid(Ulid::new()),
        };
        assert!(err.is_lease_invalid());
        assert!(err.to_string().contains("no longer valid"));

        let err = QueueError::transport("receive", "connection reset");
        assert!(!err.is_lease_invalid());
        assert_eq!(
            err.to_string(),
            "queue transport failed during receive: connection reset"
        );
    }
}
