//! Kafka implementations of the message-log traits.
//!
//! - [`KafkaClickPublisher`] - producer used by the outbox relay
//! - [`KafkaClickStream`] - consumer-group reader with manual offset commit

pub mod kafka_consumer;
pub mod kafka_publisher;

pub use kafka_consumer::KafkaClickStream;
pub use kafka_publisher::KafkaClickPublisher;
