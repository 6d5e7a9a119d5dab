//! Lease renewal guard.
//!
//! Runs next to the handler and keeps the message invisible to other
//! receivers for as long as the handler is busy. It wakes every half window
//! (rounded to whole seconds) and renews for a full window, which leaves a
//! whole window of slack if one renewal round-trip is slow.

use std::time::Duration;

use crate::app::shutdown::ShutdownSignal;
use crate::domain::LeaseHandle;
use crate::ports::{LogEntry, LogLevel, LogSink, MessageQueue};

/// Wait between renewals: half the window, rounded half to even on whole
/// seconds (3s -> 2s, 5s -> 2s). Always strictly shorter than the window;
/// when rounding would give zero or the whole window, the interval is
/// exactly half.
pub fn renewal_interval(window: Duration) -> Duration {
    let half_secs = (window.as_secs_f64() / 2.0).round_ties_even();
    let rounded = Duration::from_secs_f64(half_secs);
    if rounded.is_zero() || rounded >= window {
        window / 2
    } else {
        rounded
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenewalSummary {
    /// Renewals the queue accepted.
    pub renewals: u32,
    /// The queue reported the lease gone; renewal stopped early.
    pub lease_lost: bool,
}

/// Keeps one lease alive until told to stop.
///
/// Borrows the lease for the duration of one processing attempt; the
/// coordinator joins it before touching the lease again.
pub struct RenewalGuard<'a, T, Q: ?Sized> {
    queue: &'a Q,
    lease: &'a LeaseHandle<T>,
    window: Duration,
    log: &'a dyn LogSink,
    component: &'a str,
}

impl<'a, T, Q> RenewalGuard<'a, T, Q>
where
    T: Send + Sync + 'static,
    Q: MessageQueue<T> + ?Sized,
{
    pub fn new(
        queue: &'a Q,
        lease: &'a LeaseHandle<T>,
        window: Duration,
        log: &'a dyn LogSink,
        component: &'a str,
    ) -> Self {
        Self {
            queue,
            lease,
            window,
            log,
            component,
        }
    }

    /// Renew on every interval until `stop` fires.
    ///
    /// Never issues a renewal once `stop` has fired, even if the interval
    /// elapsed at the same moment. Failures never reach the handler:
    /// `LeaseInvalid` ends the guard, transport errors are retried on the
    /// next interval.
    pub async fn run(self, mut stop: ShutdownSignal) -> RenewalSummary {
        let interval = renewal_interval(self.window);
        let mut summary = RenewalSummary::default();

        loop {
            tokio::select! {
                _ = stop.triggered() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            // both may have become ready together
            if stop.is_triggered() {
                break;
            }

            match self.queue.renew(self.lease, self.window).await {
                Ok(()) => {
                    summary.renewals += 1;
                    self.log.record(LogEntry::new(
                        LogLevel::Debug,
                        self.component,
                        format!(
                            "renewed lease on {} for {:?}",
                            self.lease.message_id(),
                            self.window
                        ),
                    ));
                }
                Err(e) if e.is_lease_invalid() => {
                    summary.lease_lost = true;
                    self.log.record(
                        LogEntry::new(
                            LogLevel::Warn,
                            self.component,
                            format!(
                                "lease on {} was lost; no further renewals for this attempt",
                                self.lease.message_id()
                            ),
                        )
                        .with_error(&e),
                    );
                    break;
                }
                Err(e) => {
                    self.log.record(
                        LogEntry::new(
                            LogLevel::Warn,
                            self.component,
                            format!(
                                "renewing lease on {} failed; retrying in {:?}",
                                self.lease.message_id(),
                                interval
                            ),
                        )
                        .with_error(&e),
                    );
                }
            }
        }

        summary
    }
}
