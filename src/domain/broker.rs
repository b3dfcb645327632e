//! Message-log trait definitions.
//!
//! The relay worker and click consumer talk to the partitioned message log
//! through these traits. The Kafka implementations live in
//! `crate::infrastructure::broker`; tests use the generated mocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::AppError;

/// A click event ready for publication.
///
/// `key` is the slug: all clicks for one slug land on one partition, which
/// is what lets a single consumer instance apply them in order without
/// write skew on the per-slug counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundClick {
    pub key: String,
    pub payload: Vec<u8>,
    pub occurred_at: DateTime<Utc>,
    pub headers: Vec<(String, String)>,
}

/// Producer side of the message log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickPublisher: Send + Sync {
    /// Publishes one message, waiting at most `timeout` for the broker ack.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the publish fails or times out;
    /// the relay worker then schedules a retry with backoff.
    async fn publish(&self, message: OutboundClick, timeout: Duration) -> Result<(), AppError>;
}

/// A message fetched from the log, with enough position data to commit its
/// offset after processing.
#[derive(Debug, Clone)]
pub struct ClickMessage {
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub timestamp: Option<DateTime<Utc>>,
    pub headers: Vec<(String, String)>,
}

/// Consumer side of the message log.
///
/// Offsets are committed explicitly, only after the aggregate-store
/// transaction commits; an unacknowledged message is redelivered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickStream: Send + Sync {
    /// Waits for the next message.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on fetch failures; the consumer loop
    /// backs off and retries.
    async fn fetch(&self) -> Result<ClickMessage, AppError>;

    /// Acknowledges `message` so it is not delivered again.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the commit fails. The message may
    /// then be redelivered; the dedup registry makes that a no-op.
    async fn commit(&self, message: &ClickMessage) -> Result<(), AppError>;
}
