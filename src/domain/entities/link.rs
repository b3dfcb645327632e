//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL link with metadata.
///
/// `slug` is globally unique. The pair (slug existence, `expires_at` not in
/// the past) is the sole authority on whether the link is redirectable.
/// `clicks` is only ever incremented by the click consumer, never by the
/// redirect hot path.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub slug: String,
    pub url: String,
    pub notes: Option<String>,
    pub api_key: Option<String>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns `true` when the link has an expiration in the past relative to `at`.
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < at)
    }
}

/// Input data for creating a new link.
///
/// The `slug` is pre-generated by the service; the repository insert fails
/// with a conflict when it collides.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub slug: String,
    pub url: String,
    pub notes: Option<String>,
    pub api_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
