//! Broker client collaborator contract
//!
//! The wrappers in this crate are coded against these traits, never against a
//! concrete broker client. Backends implement them as thin pass-throughs; a
//! [`crate::bridge::kafka::Provider`] selects the backend at wiring time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A partition currently assigned to a consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: i32,
}

/// A partition's committed offset; `None` means never committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedOffset {
    pub topic: String,
    pub partition: i32,
    pub offset: Option<i64>,
}

/// Raw message delivered by one poll call
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// One event surfaced by a poll call
#[derive(Debug)]
pub enum BrokerEvent {
    Message(IncomingMessage),
    Error(BrokerError),
    /// An event kind this layer does not process (stats, rebalance, ...)
    Other,
}

/// Broker-agnostic failure; backends convert their native error into it
#[derive(Debug, Clone)]
pub struct BrokerError {
    pub message: String,
}

impl BrokerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BrokerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BrokerError {}

/// Polling consumer handle exposed by a backend
#[async_trait]
pub trait BrokerConsumer: Send + Sync {
    /// Poll for the next event, waiting at most `timeout`
    ///
    /// `None` means no event arrived within the timeout.
    async fn poll(&self, timeout: Duration) -> Option<BrokerEvent>;

    /// Partitions currently assigned to this consumer
    fn assignment(&self) -> Result<Vec<TopicPartition>, BrokerError>;

    /// Committed offsets for the given partitions, bounded by `timeout`
    async fn committed(
        &self,
        partitions: &[TopicPartition],
        timeout: Duration,
    ) -> Result<Vec<CommittedOffset>, BrokerError>;

    /// Low and high watermark offsets for one partition, bounded by `timeout`
    async fn watermarks(
        &self,
        topic: &str,
        partition: i32,
        timeout: Duration,
    ) -> Result<(i64, i64), BrokerError>;

    /// Release the subscription; the handle is unusable afterwards
    fn close(&self);
}

/// Producing handle exposed by a backend
///
/// `send` enqueues only; delivery confirmations arrive asynchronously on the
/// backend's delivery stream, which updates the wrapper's
/// [`crate::bridge::kafka::DeliveryCounters`].
pub trait BrokerProducer: Send + Sync {
    fn send(&self, topic: &str, key: &[u8], value: &[u8]) -> Result<(), BrokerError>;

    /// Block until queued messages are flushed or `timeout` elapses
    fn flush(&self, timeout: Duration) -> Result<(), BrokerError>;

    fn close(&self);
}
