//! Repository trait for daily click statistics.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::entities::DailyCount;
use crate::error::AppError;

/// Read/cleanup interface for the aggregate store's daily counters.
///
/// Counter writes are deliberately absent: only the click consumer writes to
/// the aggregate store, through [`super::ClickProcessor`], so the increment
/// stays in the same transaction as the dedup registry insert.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Returns the existing counter rows for `slug` within `[from, to]`,
    /// ordered by day. Days without clicks have no row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn get_daily(
        &self,
        slug: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>, AppError>;

    /// Removes all counter rows for `slug`. Used when a link is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete_by_slug(&self, slug: &str) -> Result<(), AppError>;
}
