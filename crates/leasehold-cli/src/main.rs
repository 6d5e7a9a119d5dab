use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::time::{Duration, sleep};
use tracing::info;
use tracing_subscriber::EnvFilter;

use leasehold_core::impls::{InMemoryQueue, TracingLogSink};
use leasehold_core::{HandlerError, MessageHandler, MessageQueue, ProcessorConfig, QueueProcessor, shutdown};

#[derive(Debug, Serialize, Deserialize)]
struct Greeting {
    name: String,
}

/// Fails the first `remaining_failures` greetings, then succeeds.
struct GreetingHandler {
    remaining_failures: AtomicU32,
}

impl GreetingHandler {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl MessageHandler<Greeting> for GreetingHandler {
    async fn handle(&self, greeting: &Greeting) -> Result<(), HandlerError> {
        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(format!("intentional failure (left={left})").into());
        }

        println!("Hello, {}!", greeting.name);
        Ok(())
    }
}

static TRACING: OnceLock<()> = OnceLock::new();

fn init_tracing() {
    TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}

/// First CLI argument, else `LEASEHOLD_CONFIG`, else defaults + environment.
fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("LEASEHOLD_CONFIG"))
        .map(PathBuf::from)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let path = config_path();
    let mut config = ProcessorConfig::load(path.as_deref())?;
    if path.is_none() && std::env::var_os("LEASEHOLD_VISIBILITY_TIMEOUT_SECS").is_none() {
        // keep the demo short: failed greetings come back after 2s
        config.visibility_timeout_secs = 2;
    }
    info!(component = %config.component, "starting demo processor");

    let queue = Arc::new(InMemoryQueue::<Greeting>::named(config.queue_name.as_str()));
    for name in ["leasehold", "tokio", "ferris"] {
        queue.enqueue(Greeting { name: name.to_string() }).await?;
    }
    info!(queue = queue.name(), messages = queue.len().await, "enqueued greetings");

    let processor = QueueProcessor::<Greeting, _>::builder(Arc::clone(&queue))
        .config(config)
        .log_sink(Arc::new(TracingLogSink::new()))
        .build()?;
    let handler = GreetingHandler::new(1);
    let (trigger, signal) = shutdown::channel();

    // stop on Ctrl-C, or once every greeting has been deleted
    let watcher = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("interrupted, shutting down"),
            _ = async {
                while !queue.is_empty().await {
                    sleep(Duration::from_millis(100)).await;
                }
            } => info!("queue drained, shutting down"),
        }
        trigger.trigger();
    };

    let (counts, _) = tokio::join!(processor.run(&handler, signal), watcher);
    let counts = counts?;

    println!(
        "completed={} failed={} renewals={} empty_polls={}",
        counts.completed, counts.failed, counts.renewals, counts.empty_polls
    );
    Ok(())
}
