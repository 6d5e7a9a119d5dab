//! ProcessorBuilder - wiring and start-up validation.
//!
//! Configuration problems surface from `build()`, before any message is
//! received.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::app::processor::QueueProcessor;
use crate::config::{ConfigError, ProcessorConfig};
use crate::impls::TracingLogSink;
use crate::ports::LogSink;

/// ```ignore
/// let processor = QueueProcessor::builder(Arc::new(queue))
///     .config(ProcessorConfig::load(None)?)
///     .build()?;
/// ```
pub struct ProcessorBuilder<T, Q: ?Sized> {
    queue: Arc<Q>,
    config: ProcessorConfig,
    log: Option<Arc<dyn LogSink>>,
    _marker: PhantomData<fn() -> T>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid processor configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl<T, Q: ?Sized> ProcessorBuilder<T, Q> {
    pub fn new(queue: Arc<Q>) -> Self {
        Self {
            queue,
            config: ProcessorConfig::default(),
            log: None,
            _marker: PhantomData,
        }
    }

    pub fn config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Defaults to [`TracingLogSink`].
    pub fn log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn build(self) -> Result<QueueProcessor<T, Q>, BuildError> {
        self.config.validate()?;

        let log = self.log.unwrap_or_else(|| Arc::new(TracingLogSink::new()));
        Ok(QueueProcessor {
            queue: self.queue,
            visibility_window: self.config.visibility_window(),
            idle_interval: self.config.idle_interval(),
            component: self.config.component,
            log,
            _marker: PhantomData,
        })
    }
}
