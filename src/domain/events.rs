//! Wire format of the click event published to the message log.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type stored on every outbox row.
pub const CLICK_EVENT_TYPE: &str = "click.recorded";

/// JSON payload of a recorded click.
///
/// `occurred_at` travels as an RFC 3339 timestamp with nanosecond precision
/// in UTC. It stays a string on the wire struct so that a payload with an
/// unparsable timestamp can still be accepted and fall back to the broker
/// message timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRecorded {
    pub event_id: String,
    pub slug: String,
    pub occurred_at: String,
}

impl ClickRecorded {
    pub fn new(event_id: Uuid, slug: &str, occurred_at: DateTime<Utc>) -> Self {
        Self {
            event_id: event_id.to_string(),
            slug: slug.to_string(),
            occurred_at: occurred_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }

    /// Parses `occurred_at` back into a UTC timestamp, `None` when malformed.
    pub fn occurred_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.occurred_at.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}
