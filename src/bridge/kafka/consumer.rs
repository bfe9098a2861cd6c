//! High-level consumer wrapper
//!
//! Owns the backend consumer handle, maintains the delivered/failed/ignored
//! counters and drives the poll loop. Each delivered message is dispatched to
//! the registered handler as raw bytes together with a [`MessageContext`];
//! handlers that want typed values decode through
//! [`MessageConsumer::decode`].
//!
//! Lifecycle: construction opens and subscribes the broker handle
//! (`Created`), [`MessageConsumer::run`] drives the loop (`Running`) until
//! the shutdown token is observed between iterations (`ShuttingDown`), and
//! [`MessageConsumer::close`] consumes the wrapper (`Closed` — enforced by
//! move semantics, no further operations are possible).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::bridge::kafka::backlog::{compute_backlog, BacklogReporter, BacklogSource, OFFSET_QUERY_TIMEOUT};
use crate::bridge::kafka::broker::{BrokerConsumer, BrokerEvent};
use crate::bridge::kafka::counters::ConsumerCounters;
use crate::bridge::kafka::error::KafkaClientError;
use crate::bridge::kafka::provider::Provider;
use crate::bridge::kafka::rate::RateReporter;
use crate::bridge::kafka::shutdown::ShutdownToken;
use crate::bridge::schema::{DecodeFailure, DecodedPair, SchemaRegistry};

/// Per-message metadata handed to the handler, discarded after dispatch
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub timestamp: Option<DateTime<Utc>>,
}

/// Receives every delivered message in poll order
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, context: &MessageContext, key: &[u8], value: &[u8]);
}

/// Consumer wrapper combining a backend handle with schema support
pub struct MessageConsumer {
    topic: String,
    broker: Box<dyn BrokerConsumer>,
    registry: Arc<SchemaRegistry>,
    handler: Arc<dyn MessageHandler>,
    counters: ConsumerCounters,
    shutdown: ShutdownToken,
    poll_timeout: Duration,
}

impl MessageConsumer {
    /// Open a consumer through the given provider
    pub fn new(
        provider: &dyn Provider,
        topic: &str,
        client_id: &str,
        registry: Arc<SchemaRegistry>,
        handler: Arc<dyn MessageHandler>,
        poll_timeout: Duration,
        shutdown: ShutdownToken,
    ) -> Result<Self, KafkaClientError> {
        let broker = provider.new_consumer(topic, client_id)?;
        Ok(Self {
            topic: topic.to_string(),
            broker,
            registry,
            handler,
            counters: ConsumerCounters::new(),
            shutdown,
            poll_timeout,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn counters(&self) -> ConsumerCounters {
        self.counters.clone()
    }

    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    /// One poll iteration
    ///
    /// Counters are updated strictly before the corresponding dispatch. A
    /// broker-reported error is recorded in `failed` and surfaced to the
    /// caller without stopping anything — the loop in
    /// [`MessageConsumer::run`] keeps going.
    pub async fn process_once(&self) -> Result<(), KafkaClientError> {
        match self.broker.poll(self.poll_timeout).await {
            Some(BrokerEvent::Message(message)) => {
                self.counters.delivered.increment();
                let context = MessageContext {
                    timestamp: message.timestamp,
                };
                self.handler
                    .handle(&context, &message.key, &message.value)
                    .await;
                Ok(())
            }
            Some(BrokerEvent::Error(e)) => {
                self.counters.failed.increment();
                Err(KafkaClientError::Broker(e))
            }
            Some(BrokerEvent::Other) => {
                self.counters.ignored.increment();
                Ok(())
            }
            // polling just indicated that there is no message
            None => Ok(()),
        }
    }

    /// Poll until the shutdown token is observed
    ///
    /// The token is checked between iterations; an in-flight poll is never
    /// preempted, so worst-case shutdown latency is one poll timeout.
    pub async fn run(&self) {
        info!("consumer loop started for topic [{}]", self.topic);
        loop {
            if let Err(e) = self.process_once().await {
                warn!("poll error on topic [{}]: {}", self.topic, e);
            }
            if self.shutdown.is_signaled() {
                break;
            }
        }
        info!("consumer loop stopped for topic [{}]", self.topic);
    }

    /// Decode a raw key/value pair through the schema registry
    pub async fn decode(&self, key: &[u8], value: &[u8]) -> Result<DecodedPair, DecodeFailure> {
        self.registry.decode_message(key, value).await
    }

    /// Current backlog over the assigned partitions
    pub async fn backlog(&self) -> Result<i64, KafkaClientError> {
        compute_backlog(self.broker.as_ref(), OFFSET_QUERY_TIMEOUT).await
    }

    /// Rate reporter wired to this consumer's delivered counter
    pub fn rate_reporter(&self, interval_ms: u64) -> Result<RateReporter, KafkaClientError> {
        RateReporter::new(
            self.topic.clone(),
            self.counters.delivered.clone(),
            self.shutdown.clone(),
            |name, rate| info!("report rate [{}] [{:.2}]", name, rate),
            interval_ms,
        )
    }

    /// Backlog reporter wired to this consumer
    pub fn backlog_reporter(
        self: Arc<Self>,
        interval_ms: u64,
    ) -> Result<BacklogReporter, KafkaClientError> {
        let name = self.topic.clone();
        let shutdown = self.shutdown.clone();
        BacklogReporter::new(
            name,
            self as Arc<dyn BacklogSource>,
            shutdown,
            |name, backlog| match backlog {
                Ok(count) => info!("report backlog [{}] [{}]", name, count),
                Err(e) => warn!("backlog unavailable [{}]: {}", name, e),
            },
            interval_ms,
        )
    }

    /// Close the broker handle; the wrapper is consumed
    pub fn close(self) {
        debug!("closing consumer for topic [{}]", self.topic);
        self.shutdown.signal();
        self.broker.close();
    }
}

#[async_trait]
impl BacklogSource for MessageConsumer {
    async fn backlog(&self) -> Result<i64, KafkaClientError> {
        MessageConsumer::backlog(self).await
    }
}
