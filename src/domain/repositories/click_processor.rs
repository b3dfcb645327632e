//! Transactional application of a click event to the aggregate counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;

/// What happened to a click event when it was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Counters were incremented: daily counter and the link total.
    Applied,
    /// The dedup registry already contained the event id; nothing changed.
    AlreadyProcessed,
    /// The link was missing or expired at `occurred_at`. The dedup row was
    /// still committed so a redelivery of the same event stays a no-op.
    LinkGone,
}

/// The single aggregate-store transaction run per consumed message.
///
/// The implementation must execute the dedup-registry insert and the counter
/// upserts inside one transaction against one store; splitting them breaks
/// the exactly-once effect under redelivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickProcessor: Send + Sync {
    /// Applies one click event:
    ///
    /// 1. insert-if-absent into the processed-event registry; a conflict
    ///    short-circuits to [`ClickOutcome::AlreadyProcessed`]
    /// 2. conditional increment of the link's total-click counter, only when
    ///    the link was active at `occurred_at`; a miss commits the dedup row
    ///    and yields [`ClickOutcome::LinkGone`]
    /// 3. upsert `+1` on the (slug, UTC day) daily counter
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors; the caller must then
    /// leave the message unacknowledged so the broker redelivers it.
    async fn apply(
        &self,
        event_id: &str,
        slug: &str,
        occurred_at: DateTime<Utc>,
    ) -> Result<ClickOutcome, AppError>;
}
