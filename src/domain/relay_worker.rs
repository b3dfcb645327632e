//! Outbox relay worker: claims pending click events and publishes them to
//! the message log.
//!
//! Multiple relay processes may run concurrently. The claim is atomic with
//! skip-locked semantics and every status transition is owner-conditional,
//! so a slow worker resumed after its lease expired cannot clobber the work
//! of the worker that recovered the event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::broker::{ClickPublisher, OutboundClick};
use crate::domain::events::ClickRecorded;
use crate::domain::repositories::ClickOutboxRepository;
use crate::error::AppError;

/// Tuning for one relay worker process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Stable identity of this process, matched on every status transition.
    pub worker_id: String,
    pub batch_size: i64,
    /// Wait between polls when a claim comes back empty.
    pub poll_interval: Duration,
    /// Short pause after a non-empty batch, to yield between bursts.
    pub idle_wait: Duration,
    /// How long a claimed row stays owned before any worker may recover it.
    pub claim_lease: Duration,
    pub retry_base: Duration,
    pub retry_max: Duration,
    pub write_timeout: Duration,
}

/// Runs the relay loop until `shutdown` flips to `true`.
///
/// Each iteration claims one batch and publishes it. A claim that returns
/// nothing waits a full `poll_interval`; a productive iteration waits only
/// `idle_wait`. Shutdown aborts the current sleep; the in-flight batch is
/// always finished first.
pub async fn run_relay_worker(
    outbox: Arc<dyn ClickOutboxRepository>,
    publisher: Arc<dyn ClickPublisher>,
    cfg: RelayConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(
        worker_id = %cfg.worker_id,
        batch_size = cfg.batch_size,
        poll_interval = ?cfg.poll_interval,
        claim_lease = ?cfg.claim_lease,
        "Outbox relay started"
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        let processed = match process_batch(outbox.as_ref(), publisher.as_ref(), &cfg).await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(error = %e, "Failed to process outbox batch");
                0
            }
        };

        let wait = if processed == 0 {
            cfg.poll_interval
        } else {
            cfg.idle_wait
        };
        if wait > Duration::ZERO {
            tokio::select! {
                _ = shutdown.changed() => {}
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    tracing::info!("Outbox relay stopped");
}

/// Claims one batch of due events and publishes each, returning how many
/// reached `sent`.
///
/// Per event:
/// - publish success transitions `processing -> sent`, owner-conditional;
///   a lost lease is logged at info and dropped, since the new owner will
///   publish the event itself
/// - publish failure transitions `processing -> pending` with the attempt
///   counter bumped and `next_attempt_at` pushed out by [`backoff_delay`]
pub async fn process_batch(
    outbox: &dyn ClickOutboxRepository,
    publisher: &dyn ClickPublisher,
    cfg: &RelayConfig,
) -> Result<usize, AppError> {
    let now = chrono::Utc::now();
    let batch = outbox
        .claim_due(now, cfg.batch_size, &cfg.worker_id, cfg.claim_lease)
        .await?;
    if batch.is_empty() {
        return Ok(0);
    }

    let mut processed = 0;
    for event in batch {
        let payload = ClickRecorded::new(event.id, &event.slug, event.occurred_at);
        let value = match serde_json::to_vec(&payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, event_id = %event.id, "Failed to encode outbox event");
                let delay = backoff_delay(cfg.retry_base, cfg.retry_max, event.attempts as u32 + 1);
                schedule_retry(outbox, cfg, event.id, &e.to_string(), now + delay).await;
                continue;
            }
        };

        let message = OutboundClick {
            key: event.slug.clone(),
            payload: value,
            occurred_at: event.occurred_at,
            headers: event.trace.header_pairs(),
        };

        match publisher.publish(message, cfg.write_timeout).await {
            Ok(()) => match outbox.mark_sent(event.id, &cfg.worker_id).await {
                Ok(()) => {
                    metrics::counter!("outbox_relay_published_total").increment(1);
                    processed += 1;
                }
                Err(AppError::NotOwned { .. }) => {
                    tracing::info!(
                        event_id = %event.id,
                        "Outbox event taken over by another worker"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        event_id = %event.id,
                        "Failed to mark outbox event as sent"
                    );
                }
            },
            Err(e) => {
                metrics::counter!("outbox_relay_retried_total").increment(1);
                let delay = backoff_delay(cfg.retry_base, cfg.retry_max, event.attempts as u32 + 1);
                tracing::warn!(
                    error = %e,
                    event_id = %event.id,
                    slug = %event.slug,
                    retry_in = ?delay,
                    "Failed to publish outbox event"
                );
                schedule_retry(outbox, cfg, event.id, &e.to_string(), now + delay).await;
            }
        }
    }

    Ok(processed)
}

async fn schedule_retry(
    outbox: &dyn ClickOutboxRepository,
    cfg: &RelayConfig,
    event_id: uuid::Uuid,
    cause: &str,
    next_attempt_at: chrono::DateTime<chrono::Utc>,
) {
    let truncated = truncate_error(cause);
    match outbox
        .mark_retry(event_id, &cfg.worker_id, &truncated, next_attempt_at)
        .await
    {
        Ok(()) => {}
        Err(AppError::NotOwned { .. }) => {
            tracing::info!(event_id = %event_id, "Outbox event taken over by another worker");
        }
        Err(e) => {
            tracing::error!(error = %e, event_id = %event_id, "Failed to mark outbox retry");
        }
    }
}

/// Deterministic exponential backoff: `min(base * 2^attempt, max)`.
///
/// No jitter: concurrent workers already differ in poll phase.
pub fn backoff_delay(base: Duration, max: Duration, attempt: u32) -> Duration {
    let mut delay = base;
    for _ in 0..attempt {
        delay = delay.saturating_mul(2);
        if delay >= max {
            return max;
        }
    }
    delay.min(max)
}

fn truncate_error(msg: &str) -> String {
    const MAX_CHARS: usize = 1000;
    if msg.chars().count() <= MAX_CHARS {
        msg.to_string()
    } else {
        msg.chars().take(MAX_CHARS).collect()
    }
}
