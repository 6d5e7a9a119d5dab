use serde::{Deserialize, Serialize};

use crate::domain::{AttemptReport, AttemptState};

/// Snapshot of a queue by visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    /// Receivable right now.
    pub visible: usize,
    /// Held under an unexpired lease.
    pub leased: usize,
}

impl QueueCounts {
    pub fn total(&self) -> usize {
        self.visible + self.leased
    }
}

/// What one poll loop did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorCounts {
    pub completed: usize,
    pub failed: usize,
    /// Receives that came back empty and triggered an idle wait.
    pub empty_polls: usize,
    /// Completed attempts whose delete was rejected.
    pub delete_failures: usize,
    pub renewals: usize,
}

impl ProcessorCounts {
    pub fn received(&self) -> usize {
        self.completed + self.failed
    }

    pub fn record(&mut self, report: &AttemptReport) {
        match report.state {
            AttemptState::Completed => self.completed += 1,
            AttemptState::Failed => self.failed += 1,
            // not reported by the coordinator
            AttemptState::Received | AttemptState::Processing => {}
        }
        if report.delete_failed {
            self.delete_failures += 1;
        }
        self.renewals += report.renewals as usize;
    }
}
