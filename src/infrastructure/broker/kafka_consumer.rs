//! Kafka consumer-group reader for click events.

use async_trait::async_trait;
use chrono::DateTime;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Headers;
use rdkafka::{Message, Offset, TopicPartitionList};
use serde_json::json;
use std::time::Duration;

use crate::domain::broker::{ClickMessage, ClickStream};
use crate::error::AppError;

/// Reads click events as part of a consumer group with auto-commit disabled.
///
/// Offsets are committed per message, only after the caller has applied the
/// event; an uncommitted offset means the broker redelivers after a
/// rebalance or restart.
pub struct KafkaClickStream {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaClickStream {
    /// Creates the consumer and subscribes it to `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the client cannot be created or
    /// the subscription fails.
    pub fn new(
        brokers: &str,
        topic: String,
        group_id: &str,
        max_wait: Duration,
    ) -> Result<Self, AppError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("fetch.wait.max.ms", max_wait.as_millis().to_string())
            .create()
            .map_err(|e| {
                AppError::internal(
                    "Failed to create Kafka consumer",
                    json!({ "cause": e.to_string() }),
                )
            })?;

        consumer.subscribe(&[&topic]).map_err(|e| {
            AppError::internal(
                "Failed to subscribe to topic",
                json!({ "topic": topic, "cause": e.to_string() }),
            )
        })?;

        Ok(Self { consumer, topic })
    }
}

#[async_trait]
impl ClickStream for KafkaClickStream {
    async fn fetch(&self) -> Result<ClickMessage, AppError> {
        let message = self.consumer.recv().await.map_err(|e| {
            AppError::internal(
                "Failed to fetch Kafka message",
                json!({ "topic": self.topic, "cause": e.to_string() }),
            )
        })?;

        let headers = message
            .headers()
            .map(|headers| {
                headers
                    .iter()
                    .filter_map(|header| {
                        header.value.map(|value| {
                            (
                                header.key.to_ascii_lowercase(),
                                String::from_utf8_lossy(value).into_owned(),
                            )
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ClickMessage {
            partition: message.partition(),
            offset: message.offset(),
            key: message
                .key()
                .map(|key| String::from_utf8_lossy(key).into_owned()),
            payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            timestamp: message
                .timestamp()
                .to_millis()
                .and_then(DateTime::from_timestamp_millis),
            headers,
        })
    }

    async fn commit(&self, message: &ClickMessage) -> Result<(), AppError> {
        let mut offsets = TopicPartitionList::new();
        offsets
            .add_partition_offset(
                &self.topic,
                message.partition,
                Offset::Offset(message.offset + 1),
            )
            .map_err(|e| {
                AppError::internal(
                    "Failed to build offset list",
                    json!({ "topic": self.topic, "cause": e.to_string() }),
                )
            })?;

        self.consumer
            .commit(&offsets, CommitMode::Sync)
            .map_err(|e| {
                AppError::internal(
                    "Failed to commit offset",
                    json!({
                        "topic": self.topic,
                        "partition": message.partition,
                        "offset": message.offset,
                        "cause": e.to_string()
                    }),
                )
            })
    }
}
