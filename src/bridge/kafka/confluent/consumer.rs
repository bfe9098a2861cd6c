//! rdkafka consumer pass-through

use async_trait::async_trait;
use chrono::DateTime;
use log::debug;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message as KafkaMessage;
use rdkafka::{Offset, TopicPartitionList};
use std::time::Duration;

use crate::bridge::kafka::broker::{
    BrokerConsumer, BrokerError, BrokerEvent, CommittedOffset, IncomingMessage, TopicPartition,
};
use crate::bridge::kafka::config::ProviderConfig;
use crate::bridge::kafka::error::KafkaClientError;

/// Consumer handle over an rdkafka `StreamConsumer`
pub struct ConfluentConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl ConfluentConsumer {
    /// Create and subscribe; both failures are fatal setup errors
    pub fn new(
        config: &ProviderConfig,
        topic: &str,
        client_id: &str,
    ) -> Result<Self, KafkaClientError> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.common.brokers)
            .set("group.id", &config.consumer.group_id)
            .set("client.id", client_id)
            .set(
                "session.timeout.ms",
                config.consumer.session_timeout.as_millis().to_string(),
            )
            .set(
                "auto.offset.reset",
                config.consumer.auto_offset_reset.as_str(),
            );
        for (key, value) in &config.common.custom {
            client_config.set(key, value);
        }

        let consumer: StreamConsumer = client_config
            .create()
            .map_err(|e| KafkaClientError::setup(format!("cannot create consumer: {}", e)))?;
        consumer.subscribe(&[topic]).map_err(|e| {
            KafkaClientError::setup(format!("cannot subscribe to topic [{}]: {}", topic, e))
        })?;

        Ok(Self {
            consumer,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl BrokerConsumer for ConfluentConsumer {
    async fn poll(&self, timeout: Duration) -> Option<BrokerEvent> {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            // no message within the poll interval
            Err(_) => None,
            Ok(Ok(message)) => {
                let timestamp = message
                    .timestamp()
                    .to_millis()
                    .and_then(DateTime::from_timestamp_millis);
                Some(BrokerEvent::Message(IncomingMessage {
                    key: message.key().map(|k| k.to_vec()).unwrap_or_default(),
                    value: message.payload().map(|p| p.to_vec()).unwrap_or_default(),
                    timestamp,
                }))
            }
            Ok(Err(e)) => Some(BrokerEvent::Error(BrokerError::from(e))),
        }
    }

    fn assignment(&self) -> Result<Vec<TopicPartition>, BrokerError> {
        let assigned = self.consumer.assignment()?;
        Ok(assigned
            .elements()
            .iter()
            .map(|elem| TopicPartition {
                topic: elem.topic().to_string(),
                partition: elem.partition(),
            })
            .collect())
    }

    async fn committed(
        &self,
        partitions: &[TopicPartition],
        timeout: Duration,
    ) -> Result<Vec<CommittedOffset>, BrokerError> {
        let mut list = TopicPartitionList::new();
        for partition in partitions {
            list.add_partition(&partition.topic, partition.partition);
        }
        let committed = self.consumer.committed_offsets(list, timeout)?;
        Ok(committed
            .elements()
            .iter()
            .map(|elem| CommittedOffset {
                topic: elem.topic().to_string(),
                partition: elem.partition(),
                offset: match elem.offset() {
                    Offset::Offset(offset) => Some(offset),
                    _ => None,
                },
            })
            .collect())
    }

    async fn watermarks(
        &self,
        topic: &str,
        partition: i32,
        timeout: Duration,
    ) -> Result<(i64, i64), BrokerError> {
        Ok(self.consumer.fetch_watermarks(topic, partition, timeout)?)
    }

    fn close(&self) {
        debug!("unsubscribing consumer for topic [{}]", self.topic);
        self.consumer.unsubscribe();
    }
}
