//! Consumer/producer wrappers, governance and lifecycle
//!
//! Application code obtains handles through a [`Provider`] and only ever
//! talks to the wrapper types; the concrete broker client stays behind the
//! [`broker`] traits.

pub mod backlog;
pub mod broker;
pub mod config;
pub mod confluent;
pub mod consumer;
pub mod counters;
pub mod error;
pub mod producer;
pub mod provider;
pub mod rate;
pub mod shutdown;

pub use backlog::{compute_backlog, BacklogReporter, BacklogSource, OFFSET_QUERY_TIMEOUT};
pub use broker::{
    BrokerConsumer, BrokerError, BrokerEvent, BrokerProducer, CommittedOffset, IncomingMessage,
    TopicPartition,
};
pub use config::{CommonConfig, ConsumerSettings, OffsetReset, ProducerSettings, ProviderConfig};
pub use confluent::ConfluentProvider;
pub use consumer::{MessageConsumer, MessageContext, MessageHandler};
pub use counters::{ConsumerCounters, Counter, DeliveryCounters};
pub use error::KafkaClientError;
pub use producer::MessageProducer;
pub use provider::{Provider, SharedProvider};
pub use rate::{RateLimiter, RateReporter};
pub use shutdown::{shutdown_signal, ShutdownSignal, ShutdownToken};
