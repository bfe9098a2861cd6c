//! Unified error type for consumer and producer operations

use crate::bridge::kafka::broker::BrokerError;
use crate::bridge::schema::SchemaError;

/// Errors surfaced by the messaging layer
///
/// Construction-time failures are fatal and never retried; poll/send
/// failures are recorded in the owning wrapper's counters and surfaced to
/// the immediate caller without stopping the loop.
#[derive(Debug)]
pub enum KafkaClientError {
    /// Construction-time failure (client creation, subscribe, wiring)
    Setup { message: String },
    /// Failure reported by the underlying broker client
    Broker(BrokerError),
    /// Reporter or limiter misconfiguration, fatal at construction
    Config { message: String },
    /// Decode/encode-path failure from the schema subsystem
    Schema(SchemaError),
}

impl KafkaClientError {
    pub fn setup(message: impl Into<String>) -> Self {
        KafkaClientError::Setup {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        KafkaClientError::Config {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for KafkaClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KafkaClientError::Setup { message } => write!(f, "Setup error: {}", message),
            KafkaClientError::Broker(err) => write!(f, "Broker error: {}", err),
            KafkaClientError::Config { message } => write!(f, "Config error: {}", message),
            KafkaClientError::Schema(err) => write!(f, "Schema error: {}", err),
        }
    }
}

impl std::error::Error for KafkaClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KafkaClientError::Broker(err) => Some(err),
            KafkaClientError::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BrokerError> for KafkaClientError {
    fn from(err: BrokerError) -> Self {
        KafkaClientError::Broker(err)
    }
}

impl From<SchemaError> for KafkaClientError {
    fn from(err: SchemaError) -> Self {
        KafkaClientError::Schema(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let setup = KafkaClientError::setup("subscribe failed");
        assert_eq!(setup.to_string(), "Setup error: subscribe failed");

        let config = KafkaClientError::config("interval must be positive");
        assert_eq!(config.to_string(), "Config error: interval must be positive");
    }

    #[test]
    fn test_error_source() {
        let setup = KafkaClientError::setup("x");
        assert!(setup.source().is_none());

        let broker = KafkaClientError::Broker(BrokerError::new("connection refused"));
        assert!(broker.source().is_some());
    }
}
