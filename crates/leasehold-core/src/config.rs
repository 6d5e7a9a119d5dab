//! Processor configuration.
//!
//! Values come from defaults, then an optional file, then `LEASEHOLD_*`
//! environment variables (e.g. `LEASEHOLD_VISIBILITY_TIMEOUT_SECS=60`).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "LEASEHOLD";

/// Longest lease a storage queue will grant (7 days).
pub const MAX_VISIBILITY_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("component name must not be empty")]
    EmptyComponent,

    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Queue the processor consumes. The processor itself never reads it;
    /// it is handed to the transport when the queue is built (see
    /// `InMemoryQueue::named`).
    pub queue_name: String,

    /// Lease length requested on receive and on every renewal.
    pub visibility_timeout_secs: u64,

    /// Back-off after an empty receive.
    pub idle_wait_ms: u64,

    /// Tag attached to every log entry the processor emits.
    pub component: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            queue_name: "default".to_string(),
            visibility_timeout_secs: 30,
            idle_wait_ms: 1000,
            component: "queue_processor".to_string(),
        }
    }
}

impl ProcessorConfig {
    pub fn visibility_window(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_secs)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.visibility_timeout_secs == 0 {
            return Err(ConfigError::NonPositive {
                field: "visibility_timeout_secs",
            });
        }
        if self.visibility_timeout_secs > MAX_VISIBILITY_TIMEOUT_SECS {
            return Err(ConfigError::TooLarge {
                field: "visibility_timeout_secs",
                max: MAX_VISIBILITY_TIMEOUT_SECS,
            });
        }
        if self.idle_wait_ms == 0 {
            return Err(ConfigError::NonPositive {
                field: "idle_wait_ms",
            });
        }
        if self.component.trim().is_empty() {
            return Err(ConfigError::EmptyComponent);
        }
        Ok(())
    }

    /// Load from an optional file plus the process environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: ProcessorConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
