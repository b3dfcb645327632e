//! Link creation, resolution, and deletion.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{ClickOutboxRepository, LinkRepository, StatsRepository};
use crate::domain::trace_context::TraceContext;
use crate::error::AppError;
use crate::utils::slug::generate_slug;
use crate::utils::url_normalizer::normalize_url;

/// Slug generation attempts before a collision is surfaced to the caller.
const MAX_SLUG_ATTEMPTS: u32 = 10;

/// Input for creating a short link.
#[derive(Debug, Clone, Default)]
pub struct CreateLinkInput {
    pub url: String,
    pub notes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub api_key: Option<String>,
}

/// Service for creating, resolving, and deleting short links.
///
/// The resolve path is the redirect hot path: it reads the link, checks the
/// expiration in memory, and durably appends the click event to the outbox
/// before the caller writes the HTTP response. The total-click counter is
/// never touched here; it is incremented by the click consumer so redirects
/// stay fast and available while the broker or aggregate store is down.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    outbox_repository: Arc<dyn ClickOutboxRepository>,
    stats_repository: Arc<dyn StatsRepository>,
    slug_length: usize,
}

impl LinkService {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        outbox_repository: Arc<dyn ClickOutboxRepository>,
        stats_repository: Arc<dyn StatsRepository>,
        slug_length: usize,
    ) -> Self {
        Self {
            link_repository,
            outbox_repository,
            stats_repository,
            slug_length,
        }
    }

    /// Creates a short link with a freshly generated slug.
    ///
    /// Retries up to [`MAX_SLUG_ATTEMPTS`] times on slug collision, each time
    /// with a new random slug; exhaustion surfaces as a conflict with no
    /// partial state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid URL and
    /// [`AppError::Conflict`] when every attempted slug collided.
    pub async fn create_link(&self, input: CreateLinkInput) -> Result<Link, AppError> {
        let url = normalize_url(&input.url)
            .map_err(|e| AppError::invalid_url(e.to_string(), json!({ "url": input.url })))?;

        let notes = input
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);
        let api_key = input
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_owned);

        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let new_link = NewLink {
                slug: generate_slug(self.slug_length),
                url: url.clone(),
                notes: notes.clone(),
                api_key: api_key.clone(),
                created_at: Utc::now(),
                expires_at: input.expires_at,
            };

            match self.link_repository.insert(new_link).await {
                Ok(link) => return Ok(link),
                Err(AppError::Conflict { .. }) => {
                    tracing::warn!(attempt, "Slug collision, retrying with a fresh slug");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict(
            "Failed to allocate a unique slug",
            json!({ "attempts": MAX_SLUG_ATTEMPTS }),
        ))
    }

    /// Looks up a link by slug, expired links included.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the slug does not exist.
    pub async fn get_link(&self, slug: &str) -> Result<Link, AppError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(AppError::not_found("Link not found", json!({ "slug": slug })));
        }

        self.link_repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "slug": slug })))
    }

    /// Resolves a slug for redirect and records the click.
    ///
    /// The outbox append happens before this returns, within the request:
    /// for every redirect the caller serves, exactly one pending click event
    /// exists. An append failure fails the whole resolve - a successful
    /// redirect without a durable click record would silently under-count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown slug,
    /// [`AppError::Expired`] for an expired one, and [`AppError::Internal`]
    /// when the outbox append fails.
    pub async fn resolve(&self, slug: &str, trace: TraceContext) -> Result<Link, AppError> {
        let link = self.get_link(slug).await?;

        let now = Utc::now();
        if link.is_expired(now) {
            return Err(AppError::expired(
                "Link expired",
                json!({ "slug": link.slug, "expired_at": link.expires_at }),
            ));
        }

        self.outbox_repository
            .enqueue_click(&link.slug, now, trace)
            .await?;

        Ok(link)
    }

    /// Deletes a link and its daily counters.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when no link matches `slug`.
    pub async fn delete_link(&self, slug: &str) -> Result<(), AppError> {
        let slug = slug.trim();
        let removed = self.link_repository.delete_by_slug(slug).await?;
        if !removed {
            return Err(AppError::not_found("Link not found", json!({ "slug": slug })));
        }

        self.stats_repository.delete_by_slug(slug).await?;
        Ok(())
    }
}
