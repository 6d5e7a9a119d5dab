//! Processing attempt state machine.

use serde::{Deserialize, Serialize};

/// State of one processing attempt.
///
/// State transitions:
/// - Received -> Processing -> Completed
/// - Received -> Processing -> Failed
///
/// Completed and Failed are terminal for the attempt. A failed message is
/// not requeued explicitly; the queue redelivers it once its lease expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttemptState {
    /// Lease handed over by the poll loop.
    Received,

    /// Handler running, lease renewal active.
    Processing,

    /// Handler succeeded and the delete was issued.
    Completed,

    /// Handler failed; the message is abandoned to lease expiry.
    Failed,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AttemptState::Completed | AttemptState::Failed)
    }

    /// Legal transitions only; anything else is a coordinator bug.
    pub fn can_transition_to(self, next: AttemptState) -> bool {
        matches!(
            (self, next),
            (AttemptState::Received, AttemptState::Processing)
                | (AttemptState::Processing, AttemptState::Completed)
                | (AttemptState::Processing, AttemptState::Failed)
        )
    }
}

/// What happened to one attempt, as reported back to the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    pub state: AttemptState,

    /// Successful renewals issued while the handler ran.
    pub renewals: u32,

    /// The queue rejected a renewal as `LeaseInvalid`.
    pub lease_lost: bool,

    /// Handler succeeded but the delete was rejected; the message may be
    /// delivered again.
    pub delete_failed: bool,
}
