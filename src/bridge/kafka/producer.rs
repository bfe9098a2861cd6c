//! High-level producer wrapper
//!
//! Encodes outgoing key/value pairs through the schema registry, applies the
//! optional rate limiter before each send and forwards the framed bytes to
//! the backend handle. Delivery confirmations arrive asynchronously on the
//! backend's delivery stream, which updates the shared
//! [`DeliveryCounters`]; [`MessageProducer::wait_until_send_complete`] drains
//! against the `in_flight` gauge.

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::bridge::kafka::broker::BrokerProducer;
use crate::bridge::kafka::counters::DeliveryCounters;
use crate::bridge::kafka::error::KafkaClientError;
use crate::bridge::kafka::provider::Provider;
use crate::bridge::kafka::rate::{RateLimiter, RateReporter};
use crate::bridge::kafka::shutdown::ShutdownToken;
use crate::bridge::schema::{Schema, SchemaRegistry};
use crate::bridge::serialization::DecodedValue;

/// Drain barrier poll cadence
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Flush budget applied when closing the producer
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Producer wrapper combining a backend handle with schema support
pub struct MessageProducer {
    topic: String,
    broker: Box<dyn BrokerProducer>,
    registry: Arc<SchemaRegistry>,
    limiter: Option<Mutex<RateLimiter>>,
    counters: DeliveryCounters,
    shutdown: ShutdownToken,
}

impl MessageProducer {
    /// Open a producer through the given provider
    pub fn new(
        provider: &dyn Provider,
        topic: &str,
        client_id: &str,
        registry: Arc<SchemaRegistry>,
        shutdown: ShutdownToken,
    ) -> Result<Self, KafkaClientError> {
        let counters = DeliveryCounters::new();
        let broker = provider.new_producer(topic, client_id, counters.clone())?;
        info!("created producer for topic [{}]", topic);
        Ok(Self {
            topic: topic.to_string(),
            broker,
            registry,
            limiter: None,
            counters,
            shutdown,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn counters(&self) -> DeliveryCounters {
        self.counters.clone()
    }

    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    /// Bound sends to `limit_per_second`
    pub fn set_rate_limit(&mut self, limit_per_second: i64) -> Result<(), KafkaClientError> {
        self.limiter = Some(Mutex::new(RateLimiter::new(limit_per_second)?));
        Ok(())
    }

    /// Encode, rate-limit and enqueue one key/value pair
    ///
    /// On acceptance the monotonic `sent` counter and the `in_flight` gauge
    /// are incremented; the delivery confirmation later settles
    /// `success`/`failed` and releases `in_flight`.
    pub async fn send(
        &self,
        key_schema: &Schema,
        key: &DecodedValue,
        value_schema: &Schema,
        value: &DecodedValue,
    ) -> Result<(), KafkaClientError> {
        let (key_bytes, value_bytes) =
            self.registry
                .encode_message(key_schema, key, value_schema, value)?;

        if let Some(limiter) = &self.limiter {
            let wait = {
                let mut limiter = limiter.lock().await;
                limiter.record_send();
                limiter.check(Instant::now())
            };
            if !wait.is_zero() {
                debug!("rate limit reached on [{}], idling {:?}", self.topic, wait);
                tokio::time::sleep(wait).await;
            }
        }

        self.broker.send(&self.topic, &key_bytes, &value_bytes)?;
        self.counters.sent.increment();
        self.counters.in_flight.increment();
        Ok(())
    }

    /// Block until every accepted send has been confirmed
    ///
    /// Polls the `in_flight` gauge on a short fixed interval. Unbounded by
    /// design: do not call it if sends can permanently fail.
    pub async fn wait_until_send_complete(&self) {
        while self.counters.in_flight.get() > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }

    /// Rate reporter wired to this producer's sent counter
    pub fn rate_reporter(&self, interval_ms: u64) -> Result<RateReporter, KafkaClientError> {
        RateReporter::new(
            self.topic.clone(),
            self.counters.sent.clone(),
            self.shutdown.clone(),
            |name, rate| info!("report rate [{}] [{:.2}]", name, rate),
            interval_ms,
        )
    }

    /// Flush and close the broker handle; the wrapper is consumed
    pub fn close(self) {
        debug!("closing producer for topic [{}]", self.topic);
        self.shutdown.signal();
        if let Err(e) = self.broker.flush(CLOSE_FLUSH_TIMEOUT) {
            warn!("flush on close failed for [{}]: {}", self.topic, e);
        }
        self.broker.close();
    }
}
