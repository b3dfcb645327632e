//! Daily click statistics with gap filling.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::entities::DailyCount;
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::error::AppError;

/// Service answering per-day click counts for a slug.
pub struct StatsService {
    link_repository: Arc<dyn LinkRepository>,
    stats_repository: Arc<dyn StatsRepository>,
}

impl StatsService {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        stats_repository: Arc<dyn StatsRepository>,
    ) -> Self {
        Self {
            link_repository,
            stats_repository,
        }
    }

    /// Returns one entry per calendar day in `[from, to]`, zero-filled.
    ///
    /// Expired links remain queryable - history does not vanish with the
    /// link's expiration. Days are UTC calendar dates.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when `from > to` and
    /// [`AppError::NotFound`] when the slug does not exist.
    pub async fn daily_stats(
        &self,
        slug: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>, AppError> {
        if to < from {
            return Err(AppError::bad_request(
                "from must be <= to",
                json!({ "from": from, "to": to }),
            ));
        }

        let slug = slug.trim();
        self.link_repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "slug": slug })))?;

        let counts = self.stats_repository.get_daily(slug, from, to).await?;
        let by_day: HashMap<NaiveDate, i64> =
            counts.into_iter().map(|c| (c.date, c.count)).collect();

        let mut daily = Vec::with_capacity((to - from).num_days() as usize + 1);
        let mut day = from;
        loop {
            daily.push(DailyCount {
                date: day,
                count: by_day.get(&day).copied().unwrap_or(0),
            });
            if day == to {
                break;
            }
            day = day.succ_opt().ok_or_else(|| {
                AppError::internal("Date range overflow", json!({ "day": day }))
            })?;
        }

        Ok(daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Link;
    use crate::domain::repositories::{MockLinkRepository, MockStatsRepository};
    use chrono::{TimeZone, Utc};

    fn existing_link(slug: &str) -> Link {
        Link {
            slug: slug.to_string(),
            url: "https://example.com".to_string(),
            notes: None,
            api_key: None,
            clicks: 8,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_daily_stats_zero_fills_missing_days() {
        let mut link_repo = MockLinkRepository::new();
        link_repo
            .expect_find_by_slug()
            .times(1)
            .returning(|slug| Ok(Some(existing_link(slug))));

        let mut stats_repo = MockStatsRepository::new();
        stats_repo.expect_get_daily().times(1).returning(|_, _, _| {
            Ok(vec![
                DailyCount { date: day(2025, 1, 1), count: 5 },
                DailyCount { date: day(2025, 1, 3), count: 3 },
            ])
        });

        let svc = StatsService::new(Arc::new(link_repo), Arc::new(stats_repo));
        let daily = svc
            .daily_stats("abc123", day(2025, 1, 1), day(2025, 1, 3))
            .await
            .unwrap();

        assert_eq!(
            daily,
            vec![
                DailyCount { date: day(2025, 1, 1), count: 5 },
                DailyCount { date: day(2025, 1, 2), count: 0 },
                DailyCount { date: day(2025, 1, 3), count: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn test_daily_stats_single_day_range() {
        let mut link_repo = MockLinkRepository::new();
        link_repo
            .expect_find_by_slug()
            .times(1)
            .returning(|slug| Ok(Some(existing_link(slug))));

        let mut stats_repo = MockStatsRepository::new();
        stats_repo
            .expect_get_daily()
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let svc = StatsService::new(Arc::new(link_repo), Arc::new(stats_repo));
        let daily = svc
            .daily_stats("abc123", day(2025, 1, 1), day(2025, 1, 1))
            .await
            .unwrap();

        assert_eq!(daily, vec![DailyCount { date: day(2025, 1, 1), count: 0 }]);
    }

    #[tokio::test]
    async fn test_daily_stats_range_length_matches_days() {
        let mut link_repo = MockLinkRepository::new();
        link_repo
            .expect_find_by_slug()
            .times(1)
            .returning(|slug| Ok(Some(existing_link(slug))));

        let mut stats_repo = MockStatsRepository::new();
        stats_repo
            .expect_get_daily()
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let svc = StatsService::new(Arc::new(link_repo), Arc::new(stats_repo));
        let daily = svc
            .daily_stats("abc123", day(2025, 1, 1), day(2025, 1, 31))
            .await
            .unwrap();

        assert_eq!(daily.len(), 31);
        assert!(daily.iter().all(|d| d.count == 0));
    }

    #[tokio::test]
    async fn test_daily_stats_rejects_unordered_range() {
        let svc = StatsService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(MockStatsRepository::new()),
        );

        let err = svc
            .daily_stats("abc123", day(2025, 1, 3), day(2025, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_daily_stats_unknown_slug_is_not_found() {
        let mut link_repo = MockLinkRepository::new();
        link_repo
            .expect_find_by_slug()
            .times(1)
            .returning(|_| Ok(None));

        let svc = StatsService::new(Arc::new(link_repo), Arc::new(MockStatsRepository::new()));

        let err = svc
            .daily_stats("nosuch", day(2025, 1, 1), day(2025, 1, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
