//! Kafka producer for click events.

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use serde_json::json;
use std::time::Duration;

use crate::domain::broker::{ClickPublisher, OutboundClick};
use crate::error::AppError;

/// Publishes click events to the configured topic, keyed by slug.
///
/// Keying by slug pins all of one slug's events to a single partition, so
/// one consumer instance sees them in order.
pub struct KafkaClickPublisher {
    producer: FutureProducer,
    topic: String,
}

impl KafkaClickPublisher {
    /// Creates a producer for `brokers` (comma-separated `host:port` list).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the client cannot be created.
    pub fn new(brokers: &str, topic: String) -> Result<Self, AppError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "30000")
            .set("allow.auto.create.topics", "true")
            .create()
            .map_err(|e| {
                AppError::internal(
                    "Failed to create Kafka producer",
                    json!({ "cause": e.to_string() }),
                )
            })?;

        Ok(Self { producer, topic })
    }
}

#[async_trait]
impl ClickPublisher for KafkaClickPublisher {
    async fn publish(&self, message: OutboundClick, timeout: Duration) -> Result<(), AppError> {
        let mut headers = OwnedHeaders::new_with_capacity(message.headers.len());
        for (key, value) in &message.headers {
            headers = headers.insert(Header {
                key,
                value: Some(value.as_bytes()),
            });
        }

        let record = FutureRecord::to(&self.topic)
            .key(&message.key)
            .payload(&message.payload)
            .timestamp(message.occurred_at.timestamp_millis())
            .headers(headers);

        self.producer
            .send(record, Timeout::After(timeout))
            .await
            .map(|_| ())
            .map_err(|(e, _)| {
                AppError::internal(
                    "Kafka publish failed",
                    json!({ "topic": self.topic, "key": message.key, "cause": e.to_string() }),
                )
            })
    }
}
