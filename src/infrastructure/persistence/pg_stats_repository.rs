//! PostgreSQL implementation of the statistics repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::DailyCount;
use crate::domain::repositories::StatsRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct DailyRow {
    day: NaiveDate,
    count: i64,
}

/// PostgreSQL repository for the daily click counters.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn get_daily(
        &self,
        slug: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>, AppError> {
        let rows = sqlx::query_as::<_, DailyRow>(
            r#"
            SELECT day, count
            FROM click_stats_daily
            WHERE slug = $1 AND day >= $2 AND day <= $3
            ORDER BY day
            "#,
        )
        .bind(slug)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailyCount {
                date: row.day,
                count: row.count,
            })
            .collect())
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM click_stats_daily WHERE slug = $1")
            .bind(slug)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
