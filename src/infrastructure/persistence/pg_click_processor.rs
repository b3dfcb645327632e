//! Consumer-side transaction applying one click event to the counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{ClickOutcome, ClickProcessor};
use crate::error::AppError;
use crate::infrastructure::persistence::pg_link_repository::ACTIVE_INCREMENT_SQL;

/// PostgreSQL implementation of the per-message aggregate transaction.
///
/// The dedup-registry insert and the counter writes share one transaction.
/// If the transaction fails before commit, nothing - including the dedup
/// row - survives, so the broker's redelivery is re-applied cleanly. Once
/// it commits, the dedup row makes every redelivery a no-op: the effect on
/// counters is exactly-once.
pub struct PgClickProcessor {
    pool: Arc<PgPool>,
}

impl PgClickProcessor {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickProcessor for PgClickProcessor {
    async fn apply(
        &self,
        event_id: &str,
        slug: &str,
        occurred_at: DateTime<Utc>,
    ) -> Result<ClickOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO processed_click_events (event_id, processed_at)
            VALUES ($1, $2)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(ClickOutcome::AlreadyProcessed);
        }

        let incremented = sqlx::query(ACTIVE_INCREMENT_SQL)
            .bind(slug)
            .bind(occurred_at)
            .execute(&mut *tx)
            .await?;

        if incremented.rows_affected() == 0 {
            // Link missing or expired at occurred_at: keep the dedup row so
            // a redelivery of this event stays retired.
            tx.commit().await?;
            return Ok(ClickOutcome::LinkGone);
        }

        sqlx::query(
            r#"
            INSERT INTO click_stats_daily (slug, day, count)
            VALUES ($1, $2, 1)
            ON CONFLICT (slug, day)
            DO UPDATE SET count = click_stats_daily.count + 1
            "#,
        )
        .bind(slug)
        .bind(occurred_at.date_naive())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ClickOutcome::Applied)
    }
}
