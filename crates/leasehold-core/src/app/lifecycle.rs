//! Message lifecycle: receive -> process with renewal -> delete or abandon.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde::Serialize;

use crate::app::handler::MessageHandler;
use crate::app::processor::QueueProcessor;
use crate::app::renewal::RenewalGuard;
use crate::app::shutdown;
use crate::domain::{AttemptReport, AttemptState, HandlerError, LeaseHandle};
use crate::ports::{LogLevel, MessageQueue};

fn advance(state: &mut AttemptState, next: AttemptState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal attempt transition {state:?} -> {next:?}"
    );
    *state = next;
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl<T, Q> QueueProcessor<T, Q>
where
    T: Serialize + Send + Sync + 'static,
    Q: MessageQueue<T> + ?Sized,
{
    /// Drive one received message to a terminal state.
    ///
    /// The handler and the renewal guard run concurrently in this task and
    /// are both finished before this returns. Handler errors and panics are
    /// contained here: they are logged with the payload and the message is
    /// left for redelivery. Only a successful handler leads to a delete.
    pub async fn process_message<H>(&self, handler: &H, lease: LeaseHandle<T>) -> AttemptReport
    where
        H: MessageHandler<T> + ?Sized,
    {
        let mut state = AttemptState::Received;
        self.emit(
            LogLevel::Debug,
            format!(
                "received {} (dequeue count {})",
                lease.message_id(),
                lease.dequeue_count()
            ),
        );

        advance(&mut state, AttemptState::Processing);
        let (stop, stop_signal) = shutdown::channel();
        let guard = RenewalGuard::new(
            self.queue.as_ref(),
            &lease,
            self.visibility_window,
            self.log.as_ref(),
            &self.component,
        );
        let handling = async {
            let outcome = AssertUnwindSafe(handler.handle(lease.message()))
                .catch_unwind()
                .await;
            // the guard must see this before its next wake-up
            stop.trigger();
            outcome
        };
        let (outcome, renewal) = tokio::join!(handling, guard.run(stop_signal));

        let outcome = outcome.unwrap_or_else(|panic| {
            Err(HandlerError::new(format!(
                "handler panicked: {}",
                panic_message(panic.as_ref())
            )))
        });

        let mut report = AttemptReport {
            state,
            renewals: renewal.renewals,
            lease_lost: renewal.lease_lost,
            delete_failed: false,
        };

        match outcome {
            Ok(()) => {
                advance(&mut report.state, AttemptState::Completed);
                if let Err(e) = self.queue.delete(&lease).await {
                    report.delete_failed = true;
                    self.emit_error(
                        format!(
                            "processed {} but could not delete it; it may be delivered again",
                            lease.message_id()
                        ),
                        &e,
                    );
                } else {
                    self.emit(
                        LogLevel::Debug,
                        format!(
                            "completed {} after {} renewal(s)",
                            lease.message_id(),
                            renewal.renewals
                        ),
                    );
                }
            }
            Err(e) => {
                advance(&mut report.state, AttemptState::Failed);
                let payload = serde_json::to_string(lease.message())
                    .unwrap_or_else(|se| format!("<unserializable payload: {se}>"));
                self.emit_error(format!("Error processing queue message: {payload}"), &e);
            }
        }

        report
    }
}
