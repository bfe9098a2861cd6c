//! rdkafka-backed provider
//!
//! Thin pass-through from the broker collaborator traits to librdkafka via
//! `rdkafka`. All policy (counters, rate limiting, shutdown, schema framing)
//! lives in the wrappers; this module only adapts the native client.

mod consumer;
mod producer;

pub use consumer::ConfluentConsumer;
pub use producer::{ConfluentProducer, DeliveryTrackingContext};

use rdkafka::config::RDKafkaLogLevel;
use rdkafka::error::KafkaError;

use crate::bridge::kafka::broker::{BrokerConsumer, BrokerError, BrokerProducer};
use crate::bridge::kafka::config::ProviderConfig;
use crate::bridge::kafka::counters::DeliveryCounters;
use crate::bridge::kafka::error::KafkaClientError;
use crate::bridge::kafka::provider::Provider;
use crate::bridge::schema::{HttpSchemaResolver, SchemaResolver};

impl From<KafkaError> for BrokerError {
    fn from(err: KafkaError) -> Self {
        BrokerError::new(err.to_string())
    }
}

/// Map librdkafka's syslog-style levels onto the `log` facade
pub(crate) fn convert_log_level(level: RDKafkaLogLevel) -> log::Level {
    match level {
        RDKafkaLogLevel::Emerg
        | RDKafkaLogLevel::Alert
        | RDKafkaLogLevel::Critical
        | RDKafkaLogLevel::Error => log::Level::Error,
        RDKafkaLogLevel::Warning => log::Level::Warn,
        RDKafkaLogLevel::Notice | RDKafkaLogLevel::Info => log::Level::Info,
        RDKafkaLogLevel::Debug => log::Level::Debug,
    }
}

/// Provider selecting the rdkafka/Confluent backend
pub struct ConfluentProvider {
    config: ProviderConfig,
}

impl ConfluentProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

impl Provider for ConfluentProvider {
    fn new_consumer(
        &self,
        topic: &str,
        client_id: &str,
    ) -> Result<Box<dyn BrokerConsumer>, KafkaClientError> {
        Ok(Box::new(ConfluentConsumer::new(
            &self.config,
            topic,
            client_id,
        )?))
    }

    fn new_producer(
        &self,
        topic: &str,
        client_id: &str,
        counters: DeliveryCounters,
    ) -> Result<Box<dyn BrokerProducer>, KafkaClientError> {
        Ok(Box::new(ConfluentProducer::new(
            &self.config,
            topic,
            client_id,
            counters,
        )?))
    }

    fn new_schema_resolver(&self) -> Result<Box<dyn SchemaResolver>, KafkaClientError> {
        Ok(Box::new(HttpSchemaResolver::new(
            self.config.common.schema_registry_url.clone(),
        )))
    }
}
