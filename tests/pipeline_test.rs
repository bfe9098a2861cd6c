//! End-to-end pipeline over an in-memory backend: encode through the schema
//! registry, send through a producer wrapper, replay through a consumer
//! wrapper and decode the captured payloads back.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use streambridge::{
    BrokerConsumer, BrokerError, BrokerEvent, BrokerProducer, CommittedOffset, DecodedValue,
    DeliveryCounters, IncomingMessage, JsonCodec, KafkaClientError, MessageConsumer,
    MessageContext, MessageHandler, MessageProducer, Provider, RegistryConfig, SchemaError,
    SchemaRegistry, SchemaResolver, ShutdownToken, TopicPartition,
};

/// Messages captured by the producer side, replayed by the consumer side
type Captured = Arc<Mutex<VecDeque<(Vec<u8>, Vec<u8>)>>>;

struct MemoryProducer {
    captured: Captured,
    counters: DeliveryCounters,
}

impl BrokerProducer for MemoryProducer {
    fn send(&self, _topic: &str, key: &[u8], value: &[u8]) -> Result<(), BrokerError> {
        self.captured
            .lock()
            .unwrap()
            .push_back((key.to_vec(), value.to_vec()));
        // confirm the delivery immediately
        self.counters.success.increment();
        self.counters.in_flight.decrement();
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<(), BrokerError> {
        Ok(())
    }

    fn close(&self) {}
}

struct MemoryConsumer {
    captured: Captured,
}

#[async_trait]
impl BrokerConsumer for MemoryConsumer {
    async fn poll(&self, _timeout: Duration) -> Option<BrokerEvent> {
        self.captured
            .lock()
            .unwrap()
            .pop_front()
            .map(|(key, value)| {
                BrokerEvent::Message(IncomingMessage {
                    key,
                    value,
                    timestamp: None,
                })
            })
    }

    fn assignment(&self) -> Result<Vec<TopicPartition>, BrokerError> {
        Ok(vec![TopicPartition {
            topic: "orders".to_string(),
            partition: 0,
        }])
    }

    async fn committed(
        &self,
        partitions: &[TopicPartition],
        _timeout: Duration,
    ) -> Result<Vec<CommittedOffset>, BrokerError> {
        Ok(partitions
            .iter()
            .map(|p| CommittedOffset {
                topic: p.topic.clone(),
                partition: p.partition,
                offset: None,
            })
            .collect())
    }

    async fn watermarks(
        &self,
        _topic: &str,
        _partition: i32,
        _timeout: Duration,
    ) -> Result<(i64, i64), BrokerError> {
        let pending = self.captured.lock().unwrap().len() as i64;
        Ok((0, pending))
    }

    fn close(&self) {}
}

struct MemoryProvider {
    captured: Captured,
}

impl MemoryProvider {
    fn new() -> Self {
        Self {
            captured: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

impl Provider for MemoryProvider {
    fn new_consumer(
        &self,
        _topic: &str,
        _client_id: &str,
    ) -> Result<Box<dyn BrokerConsumer>, KafkaClientError> {
        Ok(Box::new(MemoryConsumer {
            captured: self.captured.clone(),
        }))
    }

    fn new_producer(
        &self,
        _topic: &str,
        _client_id: &str,
        counters: DeliveryCounters,
    ) -> Result<Box<dyn BrokerProducer>, KafkaClientError> {
        Ok(Box::new(MemoryProducer {
            captured: self.captured.clone(),
            counters,
        }))
    }

    fn new_schema_resolver(&self) -> Result<Box<dyn SchemaResolver>, KafkaClientError> {
        Ok(Box::new(MemoryResolver))
    }
}

struct MemoryResolver;

#[async_trait]
impl SchemaResolver for MemoryResolver {
    async fn schema_by_subject(&self, _subject: &str, _version: i32) -> Result<u32, SchemaError> {
        Ok(17)
    }

    async fn register_schema(&self, _subject: &str, _definition: &str) -> Result<u32, SchemaError> {
        Ok(17)
    }
}

#[derive(Default)]
struct CapturingHandler {
    received: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
}

#[async_trait]
impl MessageHandler for CapturingHandler {
    async fn handle(&self, _context: &MessageContext, key: &[u8], value: &[u8]) {
        self.received
            .lock()
            .unwrap()
            .push((key.to_vec(), value.to_vec()));
    }
}

fn registry_for(provider: &dyn Provider) -> Arc<SchemaRegistry> {
    let resolver = provider.new_schema_resolver().unwrap();
    Arc::new(SchemaRegistry::with_config(
        resolver,
        RegistryConfig::default().register_backoff(Duration::from_millis(1)),
    ))
}

#[tokio::test]
async fn test_produce_consume_decode_round_trip() {
    let provider = MemoryProvider::new();
    let registry = registry_for(&provider);
    let schema = registry
        .register_definition(
            "orders-value",
            1,
            "{}",
            Some(Arc::new(JsonCodec)),
            Some(Arc::new(JsonCodec)),
        )
        .await
        .unwrap();

    let producer = MessageProducer::new(
        &provider,
        "orders",
        "producer-1",
        registry.clone(),
        ShutdownToken::new(),
    )
    .unwrap();

    let key = DecodedValue::Json(serde_json::json!("order-7"));
    let value = DecodedValue::Json(serde_json::json!({"total": 12, "currency": "EUR"}));
    producer.send(&schema, &key, &schema, &value).await.unwrap();
    producer.wait_until_send_complete().await;

    let counters = producer.counters();
    assert_eq!(counters.sent.get(), 1);
    assert_eq!(counters.success.get(), 1);
    assert_eq!(counters.in_flight.get(), 0);

    let handler = Arc::new(CapturingHandler::default());
    let consumer = MessageConsumer::new(
        &provider,
        "orders",
        "consumer-1",
        registry.clone(),
        handler.clone(),
        Duration::from_millis(10),
        ShutdownToken::new(),
    )
    .unwrap();

    consumer.process_once().await.unwrap();
    assert_eq!(consumer.counters().delivered.get(), 1);

    let received = handler.received.lock().unwrap();
    let (raw_key, raw_value) = &received[0];
    let pair = consumer.decode(raw_key, raw_value).await.unwrap();
    assert_eq!(pair.key, Some(key));
    assert_eq!(pair.value, Some(value));
}

#[tokio::test]
async fn test_backlog_reflects_unconsumed_messages() {
    let provider = MemoryProvider::new();
    let registry = registry_for(&provider);
    let schema = registry
        .register_definition(
            "orders-value",
            1,
            "{}",
            Some(Arc::new(JsonCodec)),
            Some(Arc::new(JsonCodec)),
        )
        .await
        .unwrap();

    let producer = MessageProducer::new(
        &provider,
        "orders",
        "producer-1",
        registry.clone(),
        ShutdownToken::new(),
    )
    .unwrap();
    let value = DecodedValue::Json(serde_json::json!(1));
    for _ in 0..3 {
        producer.send(&schema, &value, &schema, &value).await.unwrap();
    }

    let handler = Arc::new(CapturingHandler::default());
    let consumer = MessageConsumer::new(
        &provider,
        "orders",
        "consumer-1",
        registry,
        handler,
        Duration::from_millis(10),
        ShutdownToken::new(),
    )
    .unwrap();

    // never committed: effective offset is the low watermark (0)
    assert_eq!(consumer.backlog().await.unwrap(), 3);

    consumer.process_once().await.unwrap();
    assert_eq!(consumer.backlog().await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shared_shutdown_token_stops_consumer_and_reporter() {
    let provider = MemoryProvider::new();
    let registry = registry_for(&provider);

    let shutdown = ShutdownToken::new();
    let handler = Arc::new(CapturingHandler::default());
    let consumer = Arc::new(
        MessageConsumer::new(
            &provider,
            "orders",
            "consumer-1",
            registry,
            handler,
            Duration::from_millis(5),
            shutdown.clone(),
        )
        .unwrap(),
    );

    let rate_reporter = consumer.rate_reporter(10).unwrap();
    let backlog_reporter = consumer.clone().backlog_reporter(10).unwrap();

    let consumer_task = {
        let consumer = consumer.clone();
        tokio::spawn(async move { consumer.run().await })
    };
    let rate_task = tokio::spawn(rate_reporter.run());
    let backlog_task = tokio::spawn(backlog_reporter.run());

    tokio::time::sleep(Duration::from_millis(30)).await;
    shutdown.signal();

    for (name, task) in [
        ("consumer", consumer_task),
        ("rate reporter", rate_task),
        ("backlog reporter", backlog_task),
    ] {
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap_or_else(|_| panic!("{} did not stop after shutdown", name))
            .unwrap();
    }
}
