//! Cooperative cancellation.
//!
//! A `ShutdownTrigger` / `ShutdownSignal` pair over a `watch` channel. The
//! signal is passed explicitly into every wait that must be interruptible.
//! Dropping the trigger counts as a shutdown request.

use tokio::sync::watch;

/// Create a connected trigger/signal pair.
pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Request shutdown. Idempotent; in-flight work is not interrupted.
    pub fn trigger(&self) {
        // send_replace stores the value even when no receiver is alive yet
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once shutdown is requested (or the trigger is dropped).
    /// Cancel-safe, so it can sit in a `select!` next to other work.
    pub async fn triggered(&mut self) {
        // Err: trigger dropped
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_wakes_waiters() {
        let (trigger, mut signal) = channel();
        assert!(!signal.is_triggered());

        let waiter = tokio::spawn(async move {
            signal.triggered().await;
            signal.is_triggered()
        });
        trigger.trigger();

        assert!(waiter.await.unwrap());
        assert!(trigger.is_triggered());
    }

    #[tokio::test]
    async fn late_subscribers_see_earlier_trigger() {
        let (trigger, signal) = channel();
        drop(signal);
        trigger.trigger();

        let mut late = trigger.subscribe();
        assert!(late.is_triggered());
        tokio::time::timeout(Duration::from_millis(10), late.triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dropping_trigger_counts_as_shutdown() {
        let (trigger, mut signal) = channel();
        drop(trigger);

        assert!(signal.is_triggered());
        tokio::time::timeout(Duration::from_millis(10), signal.triggered())
            .await
            .unwrap();
    }
}
