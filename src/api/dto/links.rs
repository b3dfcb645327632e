//! DTOs for link creation and deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Link;

/// Request body of `POST /api/links`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    /// Destination URL; must be HTTP(S) with a non-empty host.
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,

    pub notes: Option<String>,

    /// Optional expiry. After this instant the link answers 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}

/// A created link as returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub slug: String,
    pub url: String,
    pub short_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    pub fn from_link(link: Link, base_url: &str) -> Self {
        let short_url = format!("{}/{}", base_url.trim_end_matches('/'), link.slug);
        Self {
            slug: link.slug,
            url: link.url,
            short_url,
            notes: link.notes,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

/// Response body of `DELETE /api/links/{slug}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLinkResponse {
    pub slug: String,
}
