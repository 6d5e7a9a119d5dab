use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::app::handler::MessageHandler;
use crate::app::processor::{ProcessorError, QueueProcessor};
use crate::app::shutdown::{self, ShutdownTrigger};
use crate::observability::ProcessorCounts;
use crate::ports::MessageQueue;

/// Several processors consuming the same queue, each on its own task.
/// - `request_shutdown()` stops all of them from taking new messages
/// - `shutdown_and_join()` also waits for in-flight messages to finish
pub struct ProcessorGroup {
    shutdown: ShutdownTrigger,
    joins: Vec<JoinHandle<Result<ProcessorCounts, ProcessorError>>>,
}

impl ProcessorGroup {
    /// Spawn `n` clones of `processor` sharing `handler`.
    pub fn spawn<T, Q, H>(n: usize, processor: QueueProcessor<T, Q>, handler: Arc<H>) -> Self
    where
        T: Serialize + Send + Sync + 'static,
        Q: MessageQueue<T> + ?Sized + 'static,
        H: MessageHandler<T> + ?Sized + 'static,
    {
        let (shutdown, signal) = shutdown::channel();

        let mut joins = Vec::with_capacity(n);
        for _ in 0..n {
            let processor = processor.clone();
            let handler = Arc::clone(&handler);
            let signal = signal.clone();

            joins.push(tokio::spawn(async move {
                processor.run(handler.as_ref(), signal).await
            }));
        }

        Self { shutdown, joins }
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    /// Stop taking new messages. Handlers already running are not cancelled.
    pub fn request_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Request shutdown and wait for every processor, in spawn order.
    pub async fn shutdown_and_join(self) -> Vec<Result<ProcessorCounts, ProcessorError>> {
        self.request_shutdown();

        let mut results = Vec::with_capacity(self.joins.len());
        for join in self.joins {
            results.push(join.await.unwrap_or_else(|e| Err(ProcessorError::from(e))));
        }
        results
    }
}
