//! PostgreSQL implementation of the click outbox.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::ClaimedClickEvent;
use crate::domain::events::CLICK_EVENT_TYPE;
use crate::domain::repositories::ClickOutboxRepository;
use crate::domain::trace_context::TraceContext;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClaimedRow {
    id: Uuid,
    slug: String,
    occurred_at: DateTime<Utc>,
    attempts: i32,
    traceparent: Option<String>,
    tracestate: Option<String>,
    baggage: Option<String>,
    created_at: DateTime<Utc>,
}

/// PostgreSQL repository for the click outbox.
///
/// The claim statement locks candidate rows with `FOR UPDATE SKIP LOCKED`,
/// so concurrent relay workers get disjoint batches, and orders candidates
/// by `created_at` to keep publication roughly FIFO per slug.
pub struct PgClickOutboxRepository {
    pool: Arc<PgPool>,
}

impl PgClickOutboxRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickOutboxRepository for PgClickOutboxRepository {
    async fn enqueue_click(
        &self,
        slug: &str,
        occurred_at: DateTime<Utc>,
        trace: TraceContext,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO click_outbox
                (id, event_type, slug, occurred_at,
                 traceparent, tracestate, baggage,
                 status, attempts, next_attempt_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', 0, $8, $8, $8)
            "#,
        )
        .bind(id)
        .bind(CLICK_EVENT_TYPE)
        .bind(slug)
        .bind(occurred_at)
        .bind(&trace.traceparent)
        .bind(&trace.tracestate)
        .bind(&trace.baggage)
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        Ok(id)
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        worker_id: &str,
        lease: Duration,
    ) -> Result<Vec<ClaimedClickEvent>, AppError> {
        let worker_id = worker_id.trim();
        if worker_id.is_empty() {
            return Err(AppError::internal(
                "worker_id must not be empty",
                json!({}),
            ));
        }
        let limit = limit.max(1);
        let lease_expires_at = now + lease;

        let mut rows = sqlx::query_as::<_, ClaimedRow>(
            r#"
            WITH due AS (
                SELECT id
                FROM click_outbox
                WHERE (status = 'pending' AND next_attempt_at <= $1)
                   OR (status = 'processing' AND processing_expires_at <= $1)
                ORDER BY created_at
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            UPDATE click_outbox AS o
            SET status = 'processing',
                processing_owner = $3,
                processing_expires_at = $4,
                updated_at = $1
            FROM due
            WHERE o.id = due.id
            RETURNING o.id, o.slug, o.occurred_at, o.attempts,
                      o.traceparent, o.tracestate, o.baggage, o.created_at
            "#,
        )
        .bind(now)
        .bind(limit)
        .bind(worker_id)
        .bind(lease_expires_at)
        .fetch_all(self.pool.as_ref())
        .await?;

        // UPDATE .. RETURNING does not preserve the CTE ordering.
        rows.sort_by_key(|row| row.created_at);

        Ok(rows
            .into_iter()
            .map(|row| ClaimedClickEvent {
                id: row.id,
                slug: row.slug,
                occurred_at: row.occurred_at,
                attempts: row.attempts,
                trace: TraceContext::from_values(row.traceparent, row.tracestate, row.baggage),
            })
            .collect())
    }

    async fn mark_sent(&self, id: Uuid, worker_id: &str) -> Result<(), AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE click_outbox
            SET status = 'sent',
                sent_at = $3,
                updated_at = $3,
                processing_owner = NULL,
                processing_expires_at = NULL,
                last_error = NULL
            WHERE id = $1 AND processing_owner = $2 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(worker_id)
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_owned(
                "Outbox event not owned by worker",
                json!({ "event_id": id, "worker_id": worker_id }),
            ));
        }
        Ok(())
    }

    async fn mark_retry(
        &self,
        id: Uuid,
        worker_id: &str,
        last_error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE click_outbox
            SET status = 'pending',
                attempts = attempts + 1,
                last_error = $3,
                next_attempt_at = $4,
                updated_at = $5,
                processing_owner = NULL,
                processing_expires_at = NULL
            WHERE id = $1 AND processing_owner = $2 AND status = 'processing'
            "#,
        )
        .bind(id)
        .bind(worker_id)
        .bind(last_error)
        .bind(next_attempt_at)
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_owned(
                "Outbox event not owned by worker",
                json!({ "event_id": id, "worker_id": worker_id }),
            ));
        }
        Ok(())
    }
}
