//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{map_sqlx_error, AppError};

/// Conditional compare-and-bump of the total-click counter.
///
/// Shared with [`super::PgClickProcessor`], which runs the same statement
/// inside the consumer's aggregate transaction.
pub(crate) const ACTIVE_INCREMENT_SQL: &str = r#"
UPDATE links
SET clicks = clicks + 1
WHERE slug = $1 AND (expires_at IS NULL OR expires_at >= $2)
RETURNING slug, url, notes, api_key, clicks, created_at, expires_at
"#;

#[derive(sqlx::FromRow)]
struct LinkRow {
    slug: String,
    url: String,
    notes: Option<String>,
    api_key: Option<String>,
    clicks: i64,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            slug: row.slug,
            url: row.url,
            notes: row.notes,
            api_key: row.api_key,
            clicks: row.clicks,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (slug, url, notes, api_key, clicks, created_at, expires_at)
            VALUES ($1, $2, $3, $4, 0, $5, $6)
            RETURNING slug, url, notes, api_key, clicks, created_at, expires_at
            "#,
        )
        .bind(&new_link.slug)
        .bind(&new_link.url)
        .bind(&new_link.notes)
        .bind(&new_link.api_key)
        .bind(new_link.created_at)
        .bind(new_link.expires_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match map_sqlx_error(e) {
            AppError::Conflict { .. } => {
                AppError::conflict("Slug already taken", json!({ "slug": new_link.slug }))
            }
            other => other,
        })?;

        Ok(row.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT slug, url, notes, api_key, clicks, created_at, expires_at
            FROM links
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_active_and_increment(
        &self,
        slug: &str,
        at: DateTime<Utc>,
    ) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(ACTIVE_INCREMENT_SQL)
            .bind(slug)
            .bind(at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // No active row matched; a second lookup separates expired from absent.
        match self.find_by_slug(slug).await? {
            Some(_) => Err(AppError::expired("Link expired", json!({ "slug": slug }))),
            None => Err(AppError::not_found("Link not found", json!({ "slug": slug }))),
        }
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE slug = $1")
            .bind(slug)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
