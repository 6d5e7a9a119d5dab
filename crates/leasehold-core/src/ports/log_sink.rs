//! LogSink port - where the processor reports what it did.
//!
//! The processor never formats beyond a human-readable message and, for
//! handler failures, the serialized payload. Every entry carries the
//! component name of the emitter.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// One log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    /// Rendered error chain, when the entry reports a failure.
    pub error: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            component: component.into(),
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: &(dyn std::error::Error + 'static)) -> Self {
        self.error = Some(render_error_chain(error));
        self
    }
}

/// `outer: inner: innermost`
fn render_error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // thiserror wrappers often repeat their source in Display
        if !rendered.ends_with(&cause_text) {
            rendered.push_str(": ");
            rendered.push_str(&cause_text);
        }
        source = cause.source();
    }
    rendered
}

/// Logging capability injected into the processor.
pub trait LogSink: Send + Sync {
    fn record(&self, entry: LogEntry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HandlerError;

    #[test]
    fn with_error_renders_source_chain() {
        let io = std::io::Error::other("socket closed");
        let err = HandlerError::from_error(io);
        let entry = LogEntry::new(LogLevel::Error, "queue_processor", "failed").with_error(&err);

        // HandlerError repeats its source text, so the chain is not doubled
        assert_eq!(entry.error.as_deref(), Some("socket closed"));
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }
}
