//! Outbox event as seen by the relay worker.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::trace_context::TraceContext;

/// A click event claimed from the outbox for publication.
///
/// The claiming worker holds a time-bounded lease on the row while the event
/// is in `processing`; `attempts` counts previous failed publish attempts.
#[derive(Debug, Clone)]
pub struct ClaimedClickEvent {
    pub id: Uuid,
    pub slug: String,
    pub occurred_at: DateTime<Utc>,
    pub attempts: i32,
    pub trace: TraceContext,
}
