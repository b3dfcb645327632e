//! Repository trait for short link data access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;

/// Repository interface for the link store.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when the slug is already taken and
    /// [`AppError::Internal`] on storage errors. On success the row is
    /// durable before the call returns.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its slug, including expired links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Atomically bumps the total-click counter of an active link and
    /// returns the post-increment state.
    ///
    /// A link is active when it has no expiration or expires at `at` or
    /// later. When no row matches, a second lookup separates the two miss
    /// kinds, because callers must distinguish them.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the slug does not exist,
    /// [`AppError::Expired`] when it exists but was expired at `at`, and
    /// [`AppError::Internal`] on storage errors.
    async fn find_active_and_increment(
        &self,
        slug: &str,
        at: DateTime<Utc>,
    ) -> Result<Link, AppError>;

    /// Deletes a link. Returns `true` when a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete_by_slug(&self, slug: &str) -> Result<bool, AppError>;
}
