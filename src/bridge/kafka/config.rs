//! Configuration for the wrappers and the rdkafka-backed provider

use std::collections::HashMap;
use std::time::Duration;

use crate::bridge::schema::DEFAULT_REGISTRY_URL;

/// Configuration shared between consumers and producers
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Broker list (e.g. "localhost:9092" or "broker1:9092,broker2:9092")
    pub brokers: String,
    /// Remote schema registry base URL
    pub schema_registry_url: String,
    /// Additional client properties passed straight to the backend
    pub custom: HashMap<String, String>,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            schema_registry_url: DEFAULT_REGISTRY_URL.to_string(),
            custom: HashMap::new(),
        }
    }
}

impl CommonConfig {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            ..Default::default()
        }
    }

    pub fn schema_registry_url(mut self, url: impl Into<String>) -> Self {
        self.schema_registry_url = url.into();
        self
    }

    pub fn custom_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }
}

/// Where a consumer without a committed offset starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetReset {
    Earliest,
    Latest,
}

impl OffsetReset {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
        }
    }
}

/// Consumer-side settings
#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    pub group_id: String,
    pub auto_offset_reset: OffsetReset,
    pub session_timeout: Duration,
    /// Bounded wait for each poll call
    pub poll_timeout: Duration,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            group_id: "default-group".to_string(),
            auto_offset_reset: OffsetReset::Earliest,
            session_timeout: Duration::from_secs(6),
            poll_timeout: Duration::from_millis(100),
        }
    }
}

impl ConsumerSettings {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            ..Default::default()
        }
    }

    pub fn auto_offset_reset(mut self, reset: OffsetReset) -> Self {
        self.auto_offset_reset = reset;
        self
    }

    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }
}

/// Producer-side settings
///
/// Defaults mirror a durability-first producer: all-replica acks, lz4
/// compression and idempotent delivery.
#[derive(Debug, Clone)]
pub struct ProducerSettings {
    pub message_timeout: Duration,
    pub acks: String,
    pub compression: String,
    pub idempotent: bool,
    /// Optional send-rate bound in messages per second
    pub rate_limit: Option<i64>,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            message_timeout: Duration::from_secs(5),
            acks: "all".to_string(),
            compression: "lz4".to_string(),
            idempotent: true,
            rate_limit: None,
        }
    }
}

impl ProducerSettings {
    pub fn message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout = timeout;
        self
    }

    pub fn rate_limit(mut self, limit_per_second: i64) -> Self {
        self.rate_limit = Some(limit_per_second);
        self
    }
}

/// Full configuration consumed by a provider
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub common: CommonConfig,
    pub consumer: ConsumerSettings,
    pub producer: ProducerSettings,
}

impl ProviderConfig {
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            common: CommonConfig::new(brokers),
            consumer: ConsumerSettings::new(group_id),
            producer: ProducerSettings::default(),
        }
    }
}
