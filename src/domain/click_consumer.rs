//! Idempotent click consumer: reads the message log and applies each event
//! to the aggregate counters exactly once.
//!
//! Delivery from the broker is at-least-once. The consumer makes the effect
//! at-most-once by inserting the event id into a processed-event registry in
//! the same transaction as the counter upserts, so the observable result is
//! exactly-once. An offset is committed only after that transaction commits;
//! any earlier failure leaves the message for redelivery, which the dedup
//! row then short-circuits.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;
use tracing::Instrument;

use crate::domain::broker::{ClickMessage, ClickStream};
use crate::domain::events::ClickRecorded;
use crate::domain::repositories::{ClickOutcome, ClickProcessor};
use crate::domain::trace_context::TraceContext;
use crate::error::AppError;

/// Tuning for one consumer process.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Budget for the per-message aggregate-store transaction.
    pub operation_timeout: Duration,
    /// Pause after an unexpected fetch/processing/commit error.
    pub consume_backoff: Duration,
}

/// Runs the consume loop until `shutdown` flips to `true`.
///
/// The current message is always finished (or abandoned uncommitted) before
/// the loop exits; no new message is fetched after shutdown is requested.
pub async fn run_click_consumer(
    stream: Arc<dyn ClickStream>,
    processor: Arc<dyn ClickProcessor>,
    cfg: ConsumerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(
        operation_timeout = ?cfg.operation_timeout,
        "Click consumer started"
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        let message = tokio::select! {
            _ = shutdown.changed() => continue,
            fetched = stream.fetch() => match fetched {
                Ok(m) => m,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to fetch click message");
                    backoff_pause(&mut shutdown, cfg.consume_backoff).await;
                    continue;
                }
            }
        };

        if let Err(e) = handle_message(&message, processor.as_ref(), cfg.operation_timeout).await {
            metrics::counter!("click_consumer_failed_total").increment(1);
            tracing::error!(
                error = %e,
                partition = message.partition,
                offset = message.offset,
                "Failed to process click event"
            );
            backoff_pause(&mut shutdown, cfg.consume_backoff).await;
            continue;
        }

        if let Err(e) = stream.commit(&message).await {
            tracing::error!(
                error = %e,
                partition = message.partition,
                offset = message.offset,
                "Failed to commit message offset"
            );
            backoff_pause(&mut shutdown, cfg.consume_backoff).await;
        }
    }

    tracing::info!("Click consumer stopped");
}

async fn backoff_pause(shutdown: &mut watch::Receiver<bool>, wait: Duration) {
    tokio::select! {
        _ = shutdown.changed() => {}
        _ = tokio::time::sleep(wait) => {}
    }
}

/// Processes one fetched message.
///
/// `Ok(())` means the message may be acknowledged: either its effect was
/// applied (or deduplicated, or retired for a gone link), or it is poison -
/// malformed payload or blank required fields - which is logged and dropped
/// rather than left to block the partition. The upstream outbox only emits
/// well-formed events, so the poison path is defense in depth.
///
/// An `Err` means the aggregate transaction did not commit; the caller must
/// not acknowledge, so the broker redelivers.
pub async fn handle_message(
    message: &ClickMessage,
    processor: &dyn ClickProcessor,
    operation_timeout: Duration,
) -> Result<(), AppError> {
    let event: ClickRecorded = match serde_json::from_slice(&message.payload) {
        Ok(event) => event,
        Err(e) => {
            metrics::counter!("click_consumer_poison_total").increment(1);
            tracing::warn!(
                error = %e,
                partition = message.partition,
                offset = message.offset,
                "Invalid click event payload, skipping"
            );
            return Ok(());
        }
    };

    let slug = event.slug.trim();
    let event_id = event.event_id.trim();
    if slug.is_empty() {
        metrics::counter!("click_consumer_poison_total").increment(1);
        tracing::warn!(event_id, "Click event missing slug, skipping");
        return Ok(());
    }
    if event_id.is_empty() {
        metrics::counter!("click_consumer_poison_total").increment(1);
        tracing::warn!(slug, "Click event missing event id, skipping");
        return Ok(());
    }

    let trace = TraceContext::from_pairs(&message.headers);
    let occurred_at = match event.occurred_at_utc() {
        Some(at) => at,
        None => {
            tracing::warn!(
                event_id,
                occurred_at = %event.occurred_at,
                "Invalid event timestamp, using broker timestamp"
            );
            message.timestamp.unwrap_or_else(chrono::Utc::now)
        }
    };

    let span = tracing::info_span!(
        "click_consumer.apply",
        event_id,
        slug,
        traceparent = trace.traceparent.as_deref().unwrap_or("")
    );

    let outcome = tokio::time::timeout(
        operation_timeout,
        processor.apply(event_id, slug, occurred_at),
    )
    .instrument(span)
    .await
    .map_err(|_| {
        AppError::internal(
            "Click processing timed out",
            json!({ "event_id": event_id, "slug": slug }),
        )
    })??;

    match outcome {
        ClickOutcome::Applied => {
            metrics::counter!("click_consumer_applied_total").increment(1);
            tracing::debug!("Click applied to counters");
        }
        ClickOutcome::AlreadyProcessed => {
            metrics::counter!("click_consumer_duplicate_total").increment(1);
            tracing::debug!("Click event already applied, skipping");
        }
        ClickOutcome::LinkGone => {
            metrics::counter!("click_consumer_retired_total").increment(1);
            tracing::info!("Click event retired for missing or expired link");
        }
    }

    Ok(())
}
