//! rdkafka producer pass-through with delivery tracking

use log::{debug, error, warn};
use rdkafka::config::{ClientConfig, RDKafkaLogLevel};
use rdkafka::error::KafkaError;
use rdkafka::message::{DeliveryResult, Message as KafkaMessage};
use rdkafka::producer::{BaseRecord, Producer, ProducerContext, ThreadedProducer};
use rdkafka::ClientContext;
use std::time::Duration;

use super::convert_log_level;
use crate::bridge::kafka::broker::{BrokerError, BrokerProducer};
use crate::bridge::kafka::config::ProviderConfig;
use crate::bridge::kafka::counters::DeliveryCounters;
use crate::bridge::kafka::error::KafkaClientError;

/// Producer context feeding the delivery-confirmation stream into the
/// wrapper's shared counters
///
/// rdkafka invokes `delivery` from its poller thread for every settled send;
/// each confirmation bumps `success` or `failed` and releases `in_flight`.
pub struct DeliveryTrackingContext {
    counters: DeliveryCounters,
}

impl DeliveryTrackingContext {
    pub fn new(counters: DeliveryCounters) -> Self {
        Self { counters }
    }
}

impl ClientContext for DeliveryTrackingContext {
    fn log(&self, level: RDKafkaLogLevel, fac: &str, message: &str) {
        log::log!(convert_log_level(level), "Kafka log ({}): {}", fac, message);
    }

    fn error(&self, error: KafkaError, reason: &str) {
        error!("Kafka client error: {:?}, reason: {}", error, reason);
    }
}

impl ProducerContext for DeliveryTrackingContext {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _delivery_opaque: ()) {
        match delivery_result {
            Ok(message) => {
                debug!(
                    "delivered to partition [{}] offset [{}]",
                    message.partition(),
                    message.offset()
                );
                self.counters.success.increment();
            }
            Err((err, _message)) => {
                warn!("delivery failed: {}", err);
                self.counters.failed.increment();
            }
        }
        self.counters.in_flight.decrement();
    }
}

/// Producer handle over an rdkafka `ThreadedProducer`
pub struct ConfluentProducer {
    producer: ThreadedProducer<DeliveryTrackingContext>,
}

impl ConfluentProducer {
    pub fn new(
        config: &ProviderConfig,
        topic: &str,
        client_id: &str,
        counters: DeliveryCounters,
    ) -> Result<Self, KafkaClientError> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.common.brokers)
            .set("client.id", client_id)
            .set("acks", &config.producer.acks)
            .set("compression.type", &config.producer.compression)
            .set(
                "enable.idempotence",
                config.producer.idempotent.to_string(),
            )
            .set(
                "message.timeout.ms",
                config.producer.message_timeout.as_millis().to_string(),
            );
        for (key, value) in &config.common.custom {
            client_config.set(key, value);
        }

        let producer: ThreadedProducer<DeliveryTrackingContext> = client_config
            .create_with_context(DeliveryTrackingContext::new(counters))
            .map_err(|e| {
                KafkaClientError::setup(format!(
                    "cannot create producer for topic [{}]: {}",
                    topic, e
                ))
            })?;

        Ok(Self { producer })
    }
}

impl BrokerProducer for ConfluentProducer {
    fn send(&self, topic: &str, key: &[u8], value: &[u8]) -> Result<(), BrokerError> {
        self.producer
            .send(BaseRecord::to(topic).key(key).payload(value))
            .map_err(|(err, _record)| BrokerError::from(err))
    }

    fn flush(&self, timeout: Duration) -> Result<(), BrokerError> {
        self.producer.flush(timeout).map_err(BrokerError::from)
    }

    fn close(&self) {
        if let Err(e) = self.producer.flush(Duration::from_secs(5)) {
            warn!("flush before close failed: {}", e);
        }
    }
}
