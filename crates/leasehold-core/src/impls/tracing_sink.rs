//! TracingLogSink - default sink forwarding entries to `tracing`.

use crate::ports::{LogEntry, LogLevel, LogSink};

/// Emits every entry as a `tracing` event with `component` (and `error`
/// when present) as structured fields. Subscriber setup is up to the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingLogSink {
    fn record(&self, entry: LogEntry) {
        let LogEntry {
            level,
            component,
            message,
            error,
        } = entry;

        match (level, error) {
            (LogLevel::Debug, None) => tracing::debug!(component = %component, "{message}"),
            (LogLevel::Debug, Some(e)) => {
                tracing::debug!(component = %component, error = %e, "{message}")
            }
            (LogLevel::Info, None) => tracing::info!(component = %component, "{message}"),
            (LogLevel::Info, Some(e)) => {
                tracing::info!(component = %component, error = %e, "{message}")
            }
            (LogLevel::Warn, None) => tracing::warn!(component = %component, "{message}"),
            (LogLevel::Warn, Some(e)) => {
                tracing::warn!(component = %component, error = %e, "{message}")
            }
            (LogLevel::Error, None) => tracing::error!(component = %component, "{message}"),
            (LogLevel::Error, Some(e)) => {
                tracing::error!(component = %component, error = %e, "{message}")
            }
        }
    }
}
