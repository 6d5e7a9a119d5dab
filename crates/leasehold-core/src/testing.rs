//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use ulid::Ulid;

use crate::app::handler::MessageHandler;
use crate::app::shutdown::ShutdownTrigger;
use crate::domain::{HandlerError, LeaseHandle, MessageId, PopReceipt, QueueError};
use crate::ports::MessageQueue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMessage {
    pub content: u32,
}

impl TestMessage {
    pub fn new(content: u32) -> Self {
        Self { content }
    }
}

/// One scripted answer to `receive`.
#[derive(Debug, Clone)]
pub enum Step<T> {
    Message(T),
    Empty,
    Fail(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewBehavior {
    Accept,
    LeaseInvalid,
    Transport,
}

#[derive(Debug, Clone)]
pub struct ReceiveCall {
    pub at: Instant,
    pub visibility: Duration,
}

#[derive(Debug, Clone)]
pub struct RenewCall {
    pub message_id: MessageId,
    pub receipt: PopReceipt,
    pub visibility: Duration,
    pub at: Instant,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct DeleteCall {
    pub message_id: MessageId,
    pub receipt: PopReceipt,
    pub at: Instant,
}

struct Recorded<T> {
    script: VecDeque<Step<T>>,
    issued: Vec<LeaseHandle<T>>,
    receives: Vec<ReceiveCall>,
    renewals: Vec<RenewCall>,
    deletes: Vec<DeleteCall>,
}

/// Queue that answers `receive` from a fixed script (then `None` forever)
/// and records every call with its timestamp.
pub struct ScriptedQueue<T> {
    recorded: Mutex<Recorded<T>>,
    renew_behavior: RenewBehavior,
    reject_delete: Option<Box<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T: Clone> ScriptedQueue<T> {
    pub fn new(script: Vec<Step<T>>) -> Self {
        Self {
            recorded: Mutex::new(Recorded {
                script: script.into(),
                issued: Vec::new(),
                receives: Vec::new(),
                renewals: Vec::new(),
                deletes: Vec::new(),
            }),
            renew_behavior: RenewBehavior::Accept,
            reject_delete: None,
        }
    }

    pub fn of_messages(messages: impl IntoIterator<Item = T>) -> Self {
        Self::new(messages.into_iter().map(Step::Message).collect())
    }

    pub fn with_renew_behavior(mut self, behavior: RenewBehavior) -> Self {
        self.renew_behavior = behavior;
        self
    }

    /// Deletes of matching payloads fail with `LeaseInvalid`.
    pub fn reject_delete_when(mut self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.reject_delete = Some(Box::new(pred));
        self
    }

    /// Mint a lease outside the script, e.g. to drive a guard directly.
    pub fn lease_for(&self, message: T) -> LeaseHandle<T> {
        let lease = LeaseHandle::new(
            MessageId::from_ulid(Ulid::new()),
            PopReceipt::from_ulid(Ulid::new()),
            1,
            Utc::now(),
            message,
        );
        self.recorded.lock().unwrap().issued.push(lease.clone());
        lease
    }

    pub fn issued(&self) -> Vec<LeaseHandle<T>> {
        self.recorded.lock().unwrap().issued.clone()
    }

    pub fn receives(&self) -> Vec<ReceiveCall> {
        self.recorded.lock().unwrap().receives.clone()
    }

    pub fn renewals(&self) -> Vec<RenewCall> {
        self.recorded.lock().unwrap().renewals.clone()
    }

    pub fn deletes(&self) -> Vec<DeleteCall> {
        self.recorded.lock().unwrap().deletes.clone()
    }

    /// Lease issued for the first payload matching `pred`.
    pub fn lease_where(&self, pred: impl Fn(&T) -> bool) -> Option<LeaseHandle<T>> {
        self.recorded
            .lock()
            .unwrap()
            .issued
            .iter()
            .find(|lease| pred(lease.message()))
            .cloned()
    }
}

#[async_trait]
impl<T> MessageQueue<T> for ScriptedQueue<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn receive(&self, visibility: Duration) -> Result<Option<LeaseHandle<T>>, QueueError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.receives.push(ReceiveCall {
            at: Instant::now(),
            visibility,
        });
        match recorded.script.pop_front() {
            Some(Step::Message(message)) => {
                let lease = LeaseHandle::new(
                    MessageId::from_ulid(Ulid::new()),
                    PopReceipt::from_ulid(Ulid::new()),
                    1,
                    Utc::now(),
                    message,
                );
                recorded.issued.push(lease.clone());
                Ok(Some(lease))
            }
            Some(Step::Fail(reason)) => Err(QueueError::transport("receive", reason)),
            Some(Step::Empty) | None => Ok(None),
        }
    }

    async fn enqueue(&self, message: T) -> Result<(), QueueError> {
        self.recorded
            .lock()
            .unwrap()
            .script
            .push_back(Step::Message(message));
        Ok(())
    }

    async fn delete(&self, lease: &LeaseHandle<T>) -> Result<(), QueueError> {
        if self
            .reject_delete
            .as_ref()
            .is_some_and(|reject| reject(lease.message()))
        {
            return Err(QueueError::LeaseInvalid {
                message_id: lease.message_id(),
                receipt: lease.receipt(),
            });
        }
        self.recorded.lock().unwrap().deletes.push(DeleteCall {
            message_id: lease.message_id(),
            receipt: lease.receipt(),
            at: Instant::now(),
        });
        Ok(())
    }

    async fn renew(&self, lease: &LeaseHandle<T>, visibility: Duration) -> Result<(), QueueError> {
        let accepted = self.renew_behavior == RenewBehavior::Accept;
        self.recorded.lock().unwrap().renewals.push(RenewCall {
            message_id: lease.message_id(),
            receipt: lease.receipt(),
            visibility,
            at: Instant::now(),
            accepted,
        });
        match self.renew_behavior {
            RenewBehavior::Accept => Ok(()),
            RenewBehavior::LeaseInvalid => Err(QueueError::LeaseInvalid {
                message_id: lease.message_id(),
                receipt: lease.receipt(),
            }),
            RenewBehavior::Transport => Err(QueueError::transport("renew", "connection reset")),
        }
    }
}

/// Handler recording call order, with per-message misbehaviour.
#[derive(Default)]
pub struct RecordingHandler {
    processed: Mutex<Vec<u32>>,
    finished: Mutex<Vec<(u32, Instant)>>,
    fail_on: Option<u32>,
    panic_on: Option<u32>,
    slow_on: Option<(u32, Duration)>,
    stop_on: Option<(u32, Arc<ShutdownTrigger>)>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, content: u32) -> Self {
        self.fail_on = Some(content);
        self
    }

    pub fn panicking_on(mut self, content: u32) -> Self {
        self.panic_on = Some(content);
        self
    }

    pub fn slow_on(mut self, content: u32, delay: Duration) -> Self {
        self.slow_on = Some((content, delay));
        self
    }

    /// Request shutdown from inside the handler for `content`.
    pub fn stopping_on(mut self, content: u32, trigger: Arc<ShutdownTrigger>) -> Self {
        self.stop_on = Some((content, trigger));
        self
    }

    /// Contents of successfully handled messages, in call order.
    pub fn processed(&self) -> Vec<u32> {
        self.processed.lock().unwrap().clone()
    }

    /// When each handler call returned, failures included.
    pub fn finished_at(&self, content: u32) -> Option<Instant> {
        self.finished
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| *c == content)
            .map(|(_, at)| *at)
    }
}

#[async_trait]
impl MessageHandler<TestMessage> for RecordingHandler {
    async fn handle(&self, message: &TestMessage) -> Result<(), HandlerError> {
        let content = message.content;

        if let Some((target, delay)) = self.slow_on
            && target == content
        {
            tokio::time::sleep(delay).await;
        }
        if let Some((target, trigger)) = &self.stop_on
            && *target == content
        {
            trigger.trigger();
        }

        let result = if self.panic_on == Some(content) {
            panic!("handler blew up on {content}");
        } else if self.fail_on == Some(content) {
            Err(HandlerError::new(format!("Test exception for {content}")))
        } else {
            self.processed.lock().unwrap().push(content);
            Ok(())
        };

        self.finished
            .lock()
            .unwrap()
            .push((content, Instant::now()));
        result
    }
}
