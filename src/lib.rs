//! # streambridge
//!
//! A broker-agnostic messaging layer for Apache Kafka and compatible
//! brokers: produce and consume schema-tagged binary messages, monitor
//! consumer backlog and throughput, and throttle producers — without coding
//! against a concrete broker client.
//!
//! ## Features
//!
//! - **Pluggable backends**: wrappers are wired against a [`Provider`]
//!   chosen at composition time; the rdkafka-backed [`ConfluentProvider`]
//!   ships in the box
//! - **Schema-framed payloads**: every key and value carries a compact
//!   5-byte schema header resolved through a cached [`SchemaRegistry`]
//! - **Governance**: fixed-window producer rate limiting, periodic
//!   throughput and backlog reporters
//! - **Cooperative shutdown**: one [`ShutdownToken`] observed by every loop,
//!   optionally wired to SIGINT/SIGTERM
//! - **Asynchronous processing**: built on `rdkafka` & `tokio`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use streambridge::{
//!     ConfluentProvider, MessageConsumer, MessageContext, MessageHandler,
//!     Provider, ProviderConfig, SchemaRegistry, ShutdownToken,
//! };
//!
//! struct PrintHandler;
//!
//! #[async_trait::async_trait]
//! impl MessageHandler for PrintHandler {
//!     async fn handle(&self, _context: &MessageContext, key: &[u8], value: &[u8]) {
//!         println!("received {} key bytes, {} value bytes", key.len(), value.len());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = ConfluentProvider::new(ProviderConfig::new("localhost:9092", "my-group"));
//!     let registry = Arc::new(SchemaRegistry::new(provider.new_schema_resolver()?));
//!
//!     let shutdown = ShutdownToken::new();
//!     shutdown.monitor_signals();
//!
//!     let consumer = MessageConsumer::new(
//!         &provider,
//!         "my-topic",
//!         "my-client",
//!         registry,
//!         Arc::new(PrintHandler),
//!         Duration::from_millis(100),
//!         shutdown,
//!     )?;
//!     consumer.run().await;
//!     Ok(())
//! }
//! ```

pub mod bridge;

// Re-export the main API at the crate root for easy access
pub use bridge::kafka::{
    compute_backlog,
    shutdown_signal,
    BacklogReporter,
    BacklogSource,
    // Broker collaborator contract
    BrokerConsumer,
    BrokerError,
    BrokerEvent,
    BrokerProducer,
    CommittedOffset,
    // Configuration
    CommonConfig,
    // Backends
    ConfluentProvider,
    ConsumerCounters,
    ConsumerSettings,
    Counter,
    DeliveryCounters,
    IncomingMessage,
    // Errors
    KafkaClientError,
    // Core types
    MessageConsumer,
    MessageContext,
    MessageHandler,
    MessageProducer,
    OffsetReset,
    ProducerSettings,
    Provider,
    ProviderConfig,
    RateLimiter,
    RateReporter,
    ShutdownSignal,
    ShutdownToken,
    TopicPartition,
};
pub use bridge::schema::{
    DecodeFailure, DecodedPair, HttpSchemaResolver, RegistryConfig, Schema, SchemaError,
    SchemaRegistry, SchemaResolver,
};
pub use bridge::serialization::{
    AvroCodec, BytesCodec, DecodedValue, Decoder, Encoder, JsonCodec, SerializationError,
    StringCodec,
};
