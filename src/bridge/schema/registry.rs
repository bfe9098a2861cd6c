//! Cached schema registry
//!
//! The registry fronts a remote [`SchemaResolver`] with an in-memory cache
//! that is keyed both by numeric id and by subject. Both maps always point at
//! the same shared [`Schema`] instances, so either access path observes the
//! same schema identity. Registration is the only remote call with a retry
//! budget; lookups fail fast and cache reads never touch the network.

use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::resolver::SchemaResolver;
use super::wire;
use super::{DecodeFailure, SchemaError};
use crate::bridge::serialization::{DecodedValue, Decoder, Encoder};

/// A registered schema with its optional codec capabilities
///
/// Identity is the numeric `id`; the subject is a secondary unique key within
/// one registry. Instances are immutable once cached and shared via `Arc`.
pub struct Schema {
    id: u32,
    subject: String,
    version: i32,
    decoder: Option<Arc<dyn Decoder>>,
    encoder: Option<Arc<dyn Encoder>>,
}

impl Schema {
    pub fn new(
        id: u32,
        subject: impl Into<String>,
        version: i32,
        decoder: Option<Arc<dyn Decoder>>,
        encoder: Option<Arc<dyn Encoder>>,
    ) -> Self {
        Self {
            id,
            subject: subject.into(),
            version,
            decoder,
            encoder,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Append this schema's wire header to `out`
    pub fn write_header(&self, out: &mut Vec<u8>) {
        wire::write_schema_header(self.id, out);
    }

    /// Frame and encode a value: header followed by encoder output
    pub fn encode(&self, value: &DecodedValue) -> Result<Vec<u8>, SchemaError> {
        let encoder = self
            .encoder
            .as_ref()
            .ok_or(SchemaError::EncoderMissing { id: self.id })?;
        let mut buf = Vec::new();
        self.write_header(&mut buf);
        encoder.encode(value, &mut buf)?;
        Ok(buf)
    }

    /// Decode a payload (header already stripped)
    pub fn decode(&self, payload: &[u8]) -> Result<DecodedValue, SchemaError> {
        let decoder = self
            .decoder
            .as_ref()
            .ok_or(SchemaError::DecoderMissing { id: self.id })?;
        Ok(decoder.decode(payload)?)
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("subject", &self.subject)
            .field("version", &self.version)
            .field("has_decoder", &self.decoder.is_some())
            .field("has_encoder", &self.encoder.is_some())
            .finish()
    }
}

/// Registry tuning knobs
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Additional registration attempts after the first failure
    pub register_retries: u32,
    /// Fixed sleep between registration attempts
    pub register_backoff: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            register_retries: 5,
            register_backoff: Duration::from_millis(1000),
        }
    }
}

impl RegistryConfig {
    pub fn register_retries(mut self, retries: u32) -> Self {
        self.register_retries = retries;
        self
    }

    pub fn register_backoff(mut self, backoff: Duration) -> Self {
        self.register_backoff = backoff;
        self
    }
}

/// Both halves of a decoded message
///
/// An empty pair means the poll interval expired without a message (the
/// zero-length key sentinel).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedPair {
    pub key: Option<DecodedValue>,
    pub value: Option<DecodedValue>,
}

impl DecodedPair {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.value.is_none()
    }
}

#[derive(Default)]
struct CacheInner {
    by_id: HashMap<u32, Arc<Schema>>,
    by_subject: HashMap<String, Arc<Schema>>,
}

/// Write-seldom/read-often schema cache backed by a remote resolver
pub struct SchemaRegistry {
    resolver: Box<dyn SchemaResolver>,
    cache: RwLock<CacheInner>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create a registry over an explicit resolver instance
    pub fn new(resolver: Box<dyn SchemaResolver>) -> Self {
        Self::with_config(resolver, RegistryConfig::default())
    }

    pub fn with_config(resolver: Box<dyn SchemaResolver>, config: RegistryConfig) -> Self {
        Self {
            resolver,
            cache: RwLock::new(CacheInner::default()),
            config,
        }
    }

    /// Resolve a subject remotely and cache the result under both keys
    ///
    /// The resolver is called exactly once; failures surface immediately and
    /// are never retried. The cached schema carries no codecs — attach them
    /// through [`SchemaRegistry::register`] when this process also produces
    /// or consumes payloads for the subject.
    pub async fn lookup(&self, subject: &str, version: i32) -> Result<Arc<Schema>, SchemaError> {
        let id = self.resolver.schema_by_subject(subject, version).await?;
        debug!("resolved schema [{}] version [{}] to id [{}]", subject, version, id);
        let schema = Arc::new(Schema::new(id, subject, version, None, None));
        Ok(self.cache_schema(schema).await)
    }

    /// Pure cache read by schema id
    pub async fn get_by_id(&self, id: u32) -> Result<Arc<Schema>, SchemaError> {
        let cache = self.cache.read().await;
        cache.by_id.get(&id).cloned().ok_or(SchemaError::NotFound {
            key: format!("id {}", id),
        })
    }

    /// Pure cache read by subject
    pub async fn get_by_subject(&self, subject: &str) -> Result<Arc<Schema>, SchemaError> {
        let cache = self.cache.read().await;
        cache
            .by_subject
            .get(subject)
            .cloned()
            .ok_or(SchemaError::NotFound {
                key: format!("subject {}", subject),
            })
    }

    /// Register a schema definition file with the remote registry
    ///
    /// Reads the definition from disk, then delegates to
    /// [`SchemaRegistry::register_definition`].
    pub async fn register(
        &self,
        subject: &str,
        version: i32,
        schema_file: impl AsRef<Path>,
        decoder: Option<Arc<dyn Decoder>>,
        encoder: Option<Arc<dyn Encoder>>,
    ) -> Result<Arc<Schema>, SchemaError> {
        let definition = tokio::fs::read_to_string(schema_file.as_ref()).await?;
        self.register_definition(subject, version, &definition, decoder, encoder)
            .await
    }

    /// Register a schema definition, retrying on remote failure
    ///
    /// Performs up to `register_retries` additional attempts with a fixed
    /// backoff between attempts, short-circuiting on the first success. When
    /// the budget is exhausted the last resolver error is surfaced as
    /// [`SchemaError::Registration`].
    pub async fn register_definition(
        &self,
        subject: &str,
        version: i32,
        definition: &str,
        decoder: Option<Arc<dyn Decoder>>,
        encoder: Option<Arc<dyn Encoder>>,
    ) -> Result<Arc<Schema>, SchemaError> {
        let attempts = self.config.register_retries + 1;
        let mut last_error = String::new();
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.register_backoff).await;
            }
            match self.resolver.register_schema(subject, definition).await {
                Ok(id) => {
                    debug!("registered schema [{}] as id [{}]", subject, id);
                    let schema = Arc::new(Schema::new(
                        id,
                        subject,
                        version,
                        decoder.clone(),
                        encoder.clone(),
                    ));
                    return Ok(self.cache_schema(schema).await);
                }
                Err(e) => {
                    warn!(
                        "schema registration attempt {}/{} failed for [{}]: {}",
                        attempt + 1,
                        attempts,
                        subject,
                        e
                    );
                    last_error = e.to_string();
                }
            }
        }
        Err(SchemaError::Registration {
            subject: subject.to_string(),
            attempts,
            message: last_error,
        })
    }

    /// Decode a framed key/value pair
    ///
    /// A zero-length key buffer is the "no message this poll" sentinel and
    /// yields an empty pair without consulting the cache. The key side is
    /// decoded first; when the value side fails, the already-decoded key is
    /// carried on the returned [`DecodeFailure`].
    pub async fn decode_message(
        &self,
        key: &[u8],
        value: &[u8],
    ) -> Result<DecodedPair, DecodeFailure> {
        if key.is_empty() {
            return Ok(DecodedPair::empty());
        }

        let (key_id, key_payload) = wire::read_schema_header(key)?;
        let key_schema = self.get_by_id(key_id).await?;
        let decoded_key = key_schema.decode(key_payload)?;

        let (value_id, value_payload) = match wire::read_schema_header(value) {
            Ok(parts) => parts,
            Err(e) => return Err(DecodeFailure::with_key(decoded_key, e)),
        };
        let value_schema = match self.get_by_id(value_id).await {
            Ok(schema) => schema,
            Err(e) => return Err(DecodeFailure::with_key(decoded_key, e)),
        };
        let decoded_value = match value_schema.decode(value_payload) {
            Ok(value) => value,
            Err(e) => return Err(DecodeFailure::with_key(decoded_key, e)),
        };

        Ok(DecodedPair {
            key: Some(decoded_key),
            value: Some(decoded_value),
        })
    }

    /// Frame and encode a key/value pair independently
    pub fn encode_message(
        &self,
        key_schema: &Schema,
        key: &DecodedValue,
        value_schema: &Schema,
        value: &DecodedValue,
    ) -> Result<(Vec<u8>, Vec<u8>), SchemaError> {
        let key_bytes = key_schema.encode(key)?;
        let value_bytes = value_schema.encode(value)?;
        Ok((key_bytes, value_bytes))
    }

    /// Insert under both keys, evicting any stale mapping so that every
    /// entry reachable by id is reachable by subject and vice versa
    async fn cache_schema(&self, schema: Arc<Schema>) -> Arc<Schema> {
        let mut cache = self.cache.write().await;
        if let Some(prev) = cache
            .by_subject
            .insert(schema.subject.clone(), schema.clone())
        {
            if prev.id != schema.id {
                cache.by_id.remove(&prev.id);
            }
        }
        if let Some(prev) = cache.by_id.insert(schema.id, schema.clone()) {
            if prev.subject != schema.subject {
                cache.by_subject.remove(&prev.subject);
            }
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::serialization::JsonCodec;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedResolver {
        lookup_calls: AtomicU32,
        register_calls: AtomicU32,
        /// Number of register calls that fail before one succeeds
        fail_registrations: u32,
        id: u32,
    }

    impl ScriptedResolver {
        fn new(id: u32, fail_registrations: u32) -> Self {
            Self {
                lookup_calls: AtomicU32::new(0),
                register_calls: AtomicU32::new(0),
                fail_registrations,
                id,
            }
        }
    }

    #[async_trait]
    impl SchemaResolver for ScriptedResolver {
        async fn schema_by_subject(&self, _subject: &str, _version: i32) -> Result<u32, SchemaError> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.id)
        }

        async fn register_schema(
            &self,
            subject: &str,
            _definition: &str,
        ) -> Result<u32, SchemaError> {
            let call = self.register_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_registrations {
                Err(SchemaError::Resolution {
                    subject: subject.to_string(),
                    message: "registry unavailable".to_string(),
                })
            } else {
                Ok(self.id)
            }
        }
    }

    fn fast_config() -> RegistryConfig {
        RegistryConfig::default().register_backoff(Duration::from_millis(1))
    }

    fn registry_with(resolver: ScriptedResolver) -> SchemaRegistry {
        SchemaRegistry::with_config(Box::new(resolver), fast_config())
    }

    fn json_codecs() -> (Option<Arc<dyn Decoder>>, Option<Arc<dyn Encoder>>) {
        (Some(Arc::new(JsonCodec)), Some(Arc::new(JsonCodec)))
    }

    #[tokio::test]
    async fn test_lookup_caches_both_access_paths() {
        let registry = registry_with(ScriptedResolver::new(11, 0));
        let schema = registry.lookup("orders-value", 1).await.unwrap();
        assert_eq!(schema.id(), 11);

        let by_id = registry.get_by_id(11).await.unwrap();
        let by_subject = registry.get_by_subject("orders-value").await.unwrap();
        assert!(Arc::ptr_eq(&by_id, &by_subject));
        assert!(Arc::ptr_eq(&by_id, &schema));
    }

    #[tokio::test]
    async fn test_cache_miss_is_not_found() {
        let registry = registry_with(ScriptedResolver::new(11, 0));
        assert!(matches!(
            registry.get_by_id(99).await,
            Err(SchemaError::NotFound { .. })
        ));
        assert!(matches!(
            registry.get_by_subject("nope").await,
            Err(SchemaError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_register_success_short_circuits() {
        let resolver = ScriptedResolver::new(7, 2);
        let registry = registry_with(resolver);
        let (decoder, encoder) = json_codecs();
        let schema = registry
            .register_definition("orders-value", 1, "{}", decoder, encoder)
            .await
            .unwrap();
        assert_eq!(schema.id(), 7);

        // 2 failures, then the third call wins and is cached
        let cached = registry.get_by_id(7).await.unwrap();
        assert!(Arc::ptr_eq(&cached, &schema));
    }

    #[tokio::test]
    async fn test_register_exhausts_retry_budget() {
        // Never succeeds: expect exactly 6 attempts (1 + 5 retries)
        let registry = SchemaRegistry::with_config(
            Box::new(ScriptedResolver::new(7, u32::MAX)),
            fast_config(),
        );
        let start = std::time::Instant::now();
        let result = registry
            .register_definition("orders-value", 1, "{}", None, None)
            .await;
        match result {
            Err(SchemaError::Registration {
                subject, attempts, ..
            }) => {
                assert_eq!(subject, "orders-value");
                assert_eq!(attempts, 6);
            }
            other => panic!("expected Registration error, got {:?}", other),
        }
        // 5 sleeps of 1ms between the 6 attempts
        assert!(start.elapsed() >= Duration::from_millis(5));
        assert!(matches!(
            registry.get_by_id(7).await,
            Err(SchemaError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_register_attempt_count() {
        struct CountingResolver(Arc<AtomicU32>);

        #[async_trait]
        impl SchemaResolver for CountingResolver {
            async fn schema_by_subject(&self, _: &str, _: i32) -> Result<u32, SchemaError> {
                unreachable!("lookup not expected")
            }
            async fn register_schema(&self, subject: &str, _: &str) -> Result<u32, SchemaError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(SchemaError::Resolution {
                    subject: subject.to_string(),
                    message: "down".to_string(),
                })
            }
        }

        let calls = Arc::new(AtomicU32::new(0));
        let registry = SchemaRegistry::with_config(
            Box::new(CountingResolver(calls.clone())),
            fast_config(),
        );
        let _ = registry
            .register_definition("events-key", 1, "{}", None, None)
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_decode_empty_key_is_sentinel() {
        // An empty registry would fail any real decode; the sentinel must
        // short-circuit before the cache is consulted.
        let registry = registry_with(ScriptedResolver::new(1, 0));
        let pair = registry.decode_message(&[], b"ignored").await.unwrap();
        assert!(pair.is_empty());
    }

    #[tokio::test]
    async fn test_encode_decode_round_trip() {
        let registry = registry_with(ScriptedResolver::new(3, 0));
        let (decoder, encoder) = json_codecs();
        let schema = registry
            .register_definition("orders-value", 1, "{}", decoder, encoder)
            .await
            .unwrap();

        let key = DecodedValue::Json(serde_json::json!("order-1"));
        let value = DecodedValue::Json(serde_json::json!({"total": 99}));
        let (key_bytes, value_bytes) = registry
            .encode_message(&schema, &key, &schema, &value)
            .unwrap();

        assert_eq!(key_bytes[0], 0x00);
        assert_eq!(&key_bytes[1..5], &3u32.to_be_bytes());

        let pair = registry
            .decode_message(&key_bytes, &value_bytes)
            .await
            .unwrap();
        assert_eq!(pair.key, Some(key));
        assert_eq!(pair.value, Some(value));
    }

    #[tokio::test]
    async fn test_decode_without_decoder_fails() {
        let registry = registry_with(ScriptedResolver::new(5, 0));
        // lookup caches the schema without codecs
        let schema = registry.lookup("orders-value", 1).await.unwrap();

        let mut key_bytes = Vec::new();
        schema.write_header(&mut key_bytes);
        key_bytes.extend_from_slice(b"\"k\"");

        let failure = registry
            .decode_message(&key_bytes, &key_bytes)
            .await
            .unwrap_err();
        assert!(matches!(failure.error, SchemaError::DecoderMissing { id: 5 }));
        assert!(failure.key.is_none());
    }

    #[tokio::test]
    async fn test_value_failure_still_returns_decoded_key() {
        let registry = registry_with(ScriptedResolver::new(4, 0));
        let (decoder, encoder) = json_codecs();
        let schema = registry
            .register_definition("orders-value", 1, "{}", decoder, encoder)
            .await
            .unwrap();

        let key = DecodedValue::Json(serde_json::json!("order-9"));
        let key_bytes = schema.encode(&key).unwrap();

        // Value buffer too short for a header
        let failure = registry
            .decode_message(&key_bytes, &[0x00, 0x00])
            .await
            .unwrap_err();
        assert!(matches!(failure.error, SchemaError::Framing { .. }));
        assert_eq!(failure.key, Some(key));
    }

    #[tokio::test]
    async fn test_encode_without_encoder_fails() {
        let schema = Schema::new(8, "orders-key", 1, None, None);
        let result = schema.encode(&DecodedValue::Null);
        assert!(matches!(result, Err(SchemaError::EncoderMissing { id: 8 })));
    }
}
