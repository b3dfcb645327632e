//! Repository trait for the click outbox.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::ClaimedClickEvent;
use crate::domain::trace_context::TraceContext;
use crate::error::AppError;

/// Repository interface for the outbox store.
///
/// The API appends; the relay worker claims, publishes, and transitions.
/// Rows are never deleted by the pipeline - retention is an operator concern.
///
/// Status transitions: `pending -> processing -> sent` on success,
/// `pending -> processing -> pending` on publish failure. A stale
/// `processing` lease becomes claimable again once `processing_expires_at`
/// has passed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickOutboxRepository: Send + Sync {
    /// Appends a pending click event with a fresh event id.
    ///
    /// Called inside the redirect request, before the HTTP response is
    /// written: a successfully redirected click must be durably recorded
    /// even when the broker and aggregate store are down.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors; the redirect then
    /// fails with 5xx rather than silently under-counting.
    async fn enqueue_click(
        &self,
        slug: &str,
        occurred_at: DateTime<Utc>,
        trace: TraceContext,
    ) -> Result<Uuid, AppError>;

    /// Atomically claims up to `limit` due events for `worker_id`.
    ///
    /// Due means `pending` with `next_attempt_at <= now`, or `processing`
    /// with an expired lease (the previous owner crashed). Claimed rows are
    /// moved to `processing` with a lease of `lease` and returned oldest
    /// first. Rows locked by another claimant are skipped, so concurrent
    /// workers never claim the same event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        worker_id: &str,
        lease: Duration,
    ) -> Result<Vec<ClaimedClickEvent>, AppError>;

    /// Transitions a published event `processing -> sent` and clears the lease.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotOwned`] when the row is no longer owned by
    /// `worker_id` - another worker recovered the lease - and
    /// [`AppError::Internal`] on storage errors.
    async fn mark_sent(&self, id: Uuid, worker_id: &str) -> Result<(), AppError>;

    /// Transitions a failed event `processing -> pending` for a later retry.
    ///
    /// Increments `attempts`, records the truncated error, and schedules
    /// `next_attempt_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotOwned`] when the row is no longer owned by
    /// `worker_id` and [`AppError::Internal`] on storage errors.
    async fn mark_retry(
        &self,
        id: Uuid,
        worker_id: &str,
        last_error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}
