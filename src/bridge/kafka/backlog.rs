//! Consumer lag ("backlog") computation and reporting

use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

use crate::bridge::kafka::broker::BrokerConsumer;
use crate::bridge::kafka::error::KafkaClientError;
use crate::bridge::kafka::shutdown::ShutdownToken;

/// Bounded wait for committed-offset and watermark queries
pub const OFFSET_QUERY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Sum of `high watermark - effective committed offset` over the consumer's
/// currently assigned partitions
///
/// A partition with no committed offset uses its low watermark as the
/// effective offset: a consumer group that has never committed is defined to
/// have zero lag relative to the oldest available message, not lag back to
/// watermark zero. Fails with the first collaborator error; nothing is
/// partially aggregated.
pub async fn compute_backlog(
    consumer: &dyn BrokerConsumer,
    timeout: Duration,
) -> Result<i64, KafkaClientError> {
    let assigned = consumer.assignment()?;
    let committed = consumer.committed(&assigned, timeout).await?;

    let mut backlog = 0i64;
    for partition in &committed {
        let (low, high) = consumer
            .watermarks(&partition.topic, partition.partition, timeout)
            .await?;
        let effective = partition.offset.unwrap_or(low);
        backlog += high - effective;
    }
    Ok(backlog)
}

/// Anything that can report its current backlog
#[async_trait]
pub trait BacklogSource: Send + Sync {
    async fn backlog(&self) -> Result<i64, KafkaClientError>;
}

/// Periodic sampler reporting a [`BacklogSource`]'s lag
///
/// Mirrors the rate reporter's loop: each tick queries the source, invokes
/// the callback with the result, then checks the shutdown token — one extra
/// report is always emitted after shutdown is signaled.
pub struct BacklogReporter {
    name: String,
    source: Arc<dyn BacklogSource>,
    shutdown: ShutdownToken,
    report: Box<dyn Fn(&str, Result<i64, KafkaClientError>) + Send + Sync>,
    period: Duration,
}

impl BacklogReporter {
    pub fn new<F>(
        name: impl Into<String>,
        source: Arc<dyn BacklogSource>,
        shutdown: ShutdownToken,
        report: F,
        interval_ms: u64,
    ) -> Result<Self, KafkaClientError>
    where
        F: Fn(&str, Result<i64, KafkaClientError>) + Send + Sync + 'static,
    {
        if interval_ms == 0 {
            return Err(KafkaClientError::config(
                "backlog report interval must be positive",
            ));
        }
        Ok(Self {
            name: name.into(),
            source,
            shutdown,
            report: Box::new(report),
            period: Duration::from_millis(interval_ms),
        })
    }

    /// Sample until the shutdown token is observed
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let backlog = self.source.backlog().await;
            (self.report)(&self.name, backlog);
            if self.shutdown.is_signaled() {
                break;
            }
        }
        debug!("backlog reporter [{}] stopped", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::kafka::broker::{
        BrokerError, BrokerEvent, CommittedOffset, TopicPartition,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeConsumer {
        /// partition -> (low, high, committed)
        partitions: HashMap<i32, (i64, i64, Option<i64>)>,
        fail_watermarks: bool,
    }

    impl FakeConsumer {
        fn new(partitions: Vec<(i32, i64, i64, Option<i64>)>) -> Self {
            Self {
                partitions: partitions
                    .into_iter()
                    .map(|(p, low, high, committed)| (p, (low, high, committed)))
                    .collect(),
                fail_watermarks: false,
            }
        }
    }

    #[async_trait]
    impl BrokerConsumer for FakeConsumer {
        async fn poll(&self, _timeout: Duration) -> Option<BrokerEvent> {
            None
        }

        fn assignment(&self) -> Result<Vec<TopicPartition>, BrokerError> {
            let mut parts: Vec<i32> = self.partitions.keys().copied().collect();
            parts.sort_unstable();
            Ok(parts
                .into_iter()
                .map(|partition| TopicPartition {
                    topic: "orders".to_string(),
                    partition,
                })
                .collect())
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
                    offset: self.partitions[&p.partition].2,
                })
                .collect())
        }

        async fn watermarks(
            &self,
            _topic: &str,
            partition: i32,
            _timeout: Duration,
        ) -> Result<(i64, i64), BrokerError> {
            if self.fail_watermarks {
                return Err(BrokerError::new("watermark query failed"));
            }
            let (low, high, _) = self.partitions[&partition];
            Ok((low, high))
        }

        fn close(&self) {}
    }

    #[tokio::test]
    async fn test_backlog_uses_low_watermark_when_never_committed() {
        let consumer = FakeConsumer::new(vec![(0, 100, 150, None)]);
        let backlog = compute_backlog(&consumer, OFFSET_QUERY_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(backlog, 50);
    }

    #[tokio::test]
    async fn test_backlog_uses_committed_offset() {
        let consumer = FakeConsumer::new(vec![(0, 100, 150, Some(120))]);
        let backlog = compute_backlog(&consumer, OFFSET_QUERY_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(backlog, 30);
    }

    #[tokio::test]
    async fn test_backlog_sums_partitions() {
        let consumer = FakeConsumer::new(vec![
            (0, 100, 150, Some(120)),
            (1, 0, 40, None),
            (2, 10, 10, Some(10)),
        ]);
        let backlog = compute_backlog(&consumer, OFFSET_QUERY_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(backlog, 70);
    }

    #[tokio::test]
    async fn test_backlog_fails_on_first_error() {
        let mut consumer = FakeConsumer::new(vec![(0, 0, 10, None)]);
        consumer.fail_watermarks = true;
        let result = compute_backlog(&consumer, OFFSET_QUERY_TIMEOUT).await;
        assert!(matches!(result, Err(KafkaClientError::Broker(_))));
    }

    struct FixedSource(i64);

    #[async_trait]
    impl BacklogSource for FixedSource {
        async fn backlog(&self) -> Result<i64, KafkaClientError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_reporter_rejects_zero_interval() {
        let result = BacklogReporter::new(
            "orders",
            Arc::new(FixedSource(0)),
            ShutdownToken::new(),
            |_, _| {},
            0,
        );
        assert!(matches!(result, Err(KafkaClientError::Config { .. })));
    }

    #[tokio::test]
    async fn test_reporter_emits_one_sample_after_shutdown() {
        let shutdown = ShutdownToken::new();
        shutdown.signal();

        let samples: Arc<Mutex<Vec<i64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = samples.clone();
        let reporter = BacklogReporter::new(
            "orders",
            Arc::new(FixedSource(42)),
            shutdown,
            move |_, backlog| sink.lock().unwrap().push(backlog.unwrap()),
            10,
        )
        .unwrap();

        tokio::time::timeout(Duration::from_secs(2), reporter.run())
            .await
            .expect("reporter did not terminate");

        assert_eq!(samples.lock().unwrap().as_slice(), &[42]);
    }
}
