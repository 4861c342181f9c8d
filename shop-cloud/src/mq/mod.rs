//! Document event publishing
//!
//! Every write publishes `{module}.{action}` with the affected documents as
//! payload. [`BroadcastQueue`] fans events out to in-process subscribers;
//! [`NoopQueue`] is used when publishing is disabled. [`spawn_event_log`] is
//! the subscriber the server runs: it writes every event to the log.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum MqError {
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MqAction {
    Created,
    Updated,
    Deleted,
    BulkCreated,
    BulkUpdated,
    BulkDeleted,
}

impl MqAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MqAction::Created => "created",
            MqAction::Updated => "updated",
            MqAction::Deleted => "deleted",
            MqAction::BulkCreated => "bulk-created",
            MqAction::BulkUpdated => "bulk-updated",
            MqAction::BulkDeleted => "bulk-deleted",
        }
    }

    pub fn topic(&self, module: &str) -> String {
        format!("{module}.{}", self.as_str())
    }
}

/// One published event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqMessage {
    pub topic: String,
    /// Partition key, the shop id
    pub key: String,
    pub payload: Value,
}

#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: Value) -> Result<(), MqError>;
}

#[derive(Debug, Clone)]
pub struct BroadcastQueue {
    tx: broadcast::Sender<MqMessage>,
}

impl BroadcastQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MqMessage> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl MessageQueue for BroadcastQueue {
    async fn publish(&self, topic: &str, key: &str, payload: Value) -> Result<(), MqError> {
        let message = MqMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload,
        };
        if self.tx.send(message).is_err() {
            tracing::debug!(topic = %topic, "No subscribers for message");
        }
        Ok(())
    }
}

/// Log every event published on `queue` until `token` is cancelled.
/// The task returns the number of events it saw.
pub fn spawn_event_log(queue: &BroadcastQueue, token: CancellationToken) -> JoinHandle<u64> {
    let mut rx = queue.subscribe();
    tokio::spawn(async move {
        let mut seen = 0_u64;
        loop {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Ok(msg) => {
                        seen += 1;
                        tracing::info!(topic = %msg.topic, shop_id = %msg.key, "Document event");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Event log fell behind, events skipped");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }
        seen
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopQueue;

#[async_trait]
impl MessageQueue for NoopQueue {
    async fn publish(&self, _topic: &str, _key: &str, _payload: Value) -> Result<(), MqError> {
        Ok(())
    }
}
