//! Backend selection seam
//!
//! A [`Provider`] is the single indirection point producing the concrete
//! broker handles and the schema resolver. Wrappers are constructed against
//! a provider chosen at composition time; nothing in this crate reaches for
//! a concrete backend directly.

use std::sync::Arc;

use crate::bridge::kafka::broker::{BrokerConsumer, BrokerProducer};
use crate::bridge::kafka::counters::DeliveryCounters;
use crate::bridge::kafka::error::KafkaClientError;
use crate::bridge::schema::SchemaResolver;

/// Creates consumers, producers and schema resolvers for one backend
pub trait Provider: Send + Sync {
    /// Open a consumer handle subscribed to `topic`
    fn new_consumer(
        &self,
        topic: &str,
        client_id: &str,
    ) -> Result<Box<dyn BrokerConsumer>, KafkaClientError>;

    /// Open a producer handle for `topic`
    ///
    /// The backend wires its delivery-confirmation stream to `counters`:
    /// every confirmed send increments `success` or `failed` and decrements
    /// `in_flight`.
    fn new_producer(
        &self,
        topic: &str,
        client_id: &str,
        counters: DeliveryCounters,
    ) -> Result<Box<dyn BrokerProducer>, KafkaClientError>;

    /// Create a resolver against this backend's schema registry
    fn new_schema_resolver(&self) -> Result<Box<dyn SchemaResolver>, KafkaClientError>;
}

/// Convenience for providers shared across wrappers
pub type SharedProvider = Arc<dyn Provider>;
