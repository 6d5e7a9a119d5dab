//! QueueProcessor - the poll loop.
//!
//! One processor handles one message at a time:
//! 1. stop if shutdown was requested
//! 2. receive with the configured visibility window
//! 3. message: run it through the lifecycle coordinator, then loop
//! 4. empty: sleep the idle interval (interruptible), then loop
//!
//! Only a failing receive ends the loop with an error.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::app::builder::ProcessorBuilder;
use crate::app::handler::MessageHandler;
use crate::app::shutdown::ShutdownSignal;
use crate::domain::QueueError;
use crate::observability::ProcessorCounts;
use crate::ports::{LogEntry, LogLevel, LogSink, MessageQueue};

#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The queue could not be polled. Restarting is up to the supervisor.
    #[error("receive failed, processor stopped: {0}")]
    Receive(#[source] QueueError),

    /// A spawned processor task panicked or was aborted (groups only).
    #[error("processor task did not finish: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Consumes a queue with lease renewal. Cheap to clone; clones share the
/// queue and the log sink.
pub struct QueueProcessor<T, Q: ?Sized> {
    pub(crate) queue: Arc<Q>,
    pub(crate) visibility_window: Duration,
    pub(crate) idle_interval: Duration,
    pub(crate) component: String,
    pub(crate) log: Arc<dyn LogSink>,
    pub(crate) _marker: PhantomData<fn() -> T>,
}

impl<T, Q: ?Sized> Clone for QueueProcessor<T, Q> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            visibility_window: self.visibility_window,
            idle_interval: self.idle_interval,
            component: self.component.clone(),
            log: Arc::clone(&self.log),
            _marker: PhantomData,
        }
    }
}

impl<T, Q: ?Sized> QueueProcessor<T, Q> {
    pub fn builder(queue: Arc<Q>) -> ProcessorBuilder<T, Q> {
        ProcessorBuilder::new(queue)
    }

    pub fn queue(&self) -> &Arc<Q> {
        &self.queue
    }

    pub fn visibility_window(&self) -> Duration {
        self.visibility_window
    }

    pub fn idle_interval(&self) -> Duration {
        self.idle_interval
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub(crate) fn emit(&self, level: LogLevel, message: String) {
        self.log
            .record(LogEntry::new(level, self.component.as_str(), message));
    }

    pub(crate) fn emit_error(&self, message: String, error: &(dyn std::error::Error + 'static)) {
        self.log.record(
            LogEntry::new(LogLevel::Error, self.component.as_str(), message).with_error(error),
        );
    }
}

impl<T, Q> QueueProcessor<T, Q>
where
    T: Serialize + Send + Sync + 'static,
    Q: MessageQueue<T> + ?Sized,
{
    /// Poll until `shutdown` fires or a receive fails.
    ///
    /// A message already handed to the handler always runs to completion;
    /// shutdown only prevents the next receive and cuts idle waits short.
    pub async fn run<H>(
        &self,
        handler: &H,
        mut shutdown: ShutdownSignal,
    ) -> Result<ProcessorCounts, ProcessorError>
    where
        H: MessageHandler<T> + ?Sized,
    {
        let mut counts = ProcessorCounts::default();
        self.emit(
            LogLevel::Info,
            format!(
                "processing started (visibility {:?}, idle {:?})",
                self.visibility_window, self.idle_interval
            ),
        );

        loop {
            if shutdown.is_triggered() {
                break;
            }

            // receive may block inside the transport, so it races shutdown
            let received = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                received = self.queue.receive(self.visibility_window) => received,
            };

            let lease = match received {
                Ok(lease) => lease,
                Err(e) => {
                    let err = ProcessorError::Receive(e);
                    self.emit_error("receive failed, processing stopped".to_string(), &err);
                    return Err(err);
                }
            };

            match lease {
                Some(lease) => {
                    let report = self.process_message(handler, lease).await;
                    counts.record(&report);
                }
                None => {
                    counts.empty_polls += 1;
                    tokio::select! {
                        biased;
                        _ = shutdown.triggered() => break,
                        _ = tokio::time::sleep(self.idle_interval) => {}
                    }
                }
            }
        }

        self.emit(
            LogLevel::Info,
            format!(
                "processing stopped: {} completed, {} failed",
                counts.completed, counts.failed
            ),
        );
        Ok(counts)
    }
}
