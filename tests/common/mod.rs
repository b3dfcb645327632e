#![allow(dead_code)]

//! In-memory fakes backing the handler and pipeline tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Router;
use axum_test::TestServer;
use snaplink::api::handlers::{
    create_link_handler, delete_link_handler, redirect_handler, stats_handler,
};
use snaplink::application::services::{LinkService, StatsService};
use snaplink::domain::broker::{ClickPublisher, OutboundClick};
use snaplink::domain::entities::{ClaimedClickEvent, DailyCount, Link, NewLink};
use snaplink::domain::repositories::{
    ClickOutboxRepository, ClickOutcome, ClickProcessor, LinkRepository, StatsRepository,
};
use snaplink::domain::trace_context::TraceContext;
use snaplink::error::AppError;
use snaplink::state::AppState;

// ── Link store ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryLinkRepository {
    links: Mutex<HashMap<String, Link>>,
}

impl MemoryLinkRepository {
    pub fn seed(&self, link: Link) {
        self.links.lock().unwrap().insert(link.slug.clone(), link);
    }

    pub fn get(&self, slug: &str) -> Option<Link> {
        self.links.lock().unwrap().get(slug).cloned()
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();
        if links.contains_key(&new_link.slug) {
            return Err(AppError::conflict("Slug already taken", json!({})));
        }
        let link = Link {
            slug: new_link.slug.clone(),
            url: new_link.url,
            notes: new_link.notes,
            api_key: new_link.api_key,
            clicks: 0,
            created_at: new_link.created_at,
            expires_at: new_link.expires_at,
        };
        links.insert(new_link.slug, link.clone());
        Ok(link)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.lock().unwrap().get(slug).cloned())
    }

    async fn find_active_and_increment(
        &self,
        slug: &str,
        at: DateTime<Utc>,
    ) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();
        match links.get_mut(slug) {
            Some(link) if !link.is_expired(at) => {
                link.clicks += 1;
                Ok(link.clone())
            }
            Some(_) => Err(AppError::expired("Link expired", json!({ "slug": slug }))),
            None => Err(AppError::not_found("Link not found", json!({ "slug": slug }))),
        }
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, AppError> {
        Ok(self.links.lock().unwrap().remove(slug).is_some())
    }
}

// ── Outbox store ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxStatus {
    Pending,
    Processing,
    Sent,
}

#[derive(Debug, Clone)]
pub struct OutboxRow {
    pub id: Uuid,
    pub slug: String,
    pub occurred_at: DateTime<Utc>,
    pub trace: TraceContext,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub processing_owner: Option<String>,
    pub processing_expires_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct MemoryOutboxRepository {
    rows: Mutex<Vec<OutboxRow>>,
}

impl MemoryOutboxRepository {
    pub fn rows(&self) -> Vec<OutboxRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn seed(&self, row: OutboxRow) {
        self.rows.lock().unwrap().push(row);
    }
}

#[async_trait]
impl ClickOutboxRepository for MemoryOutboxRepository {
    async fn enqueue_click(
        &self,
        slug: &str,
        occurred_at: DateTime<Utc>,
        trace: TraceContext,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.rows.lock().unwrap().push(OutboxRow {
            id,
            slug: slug.to_string(),
            occurred_at,
            trace,
            status: OutboxStatus::Pending,
            attempts: 0,
            next_attempt_at: now,
            processing_owner: None,
            processing_expires_at: None,
            last_error: None,
            created_at: now,
            sent_at: None,
        });
        Ok(id)
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        worker_id: &str,
        lease: Duration,
    ) -> Result<Vec<ClaimedClickEvent>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let mut due: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| match row.status {
                OutboxStatus::Pending => row.next_attempt_at <= now,
                OutboxStatus::Processing => {
                    row.processing_expires_at.is_some_and(|expires| expires <= now)
                }
                OutboxStatus::Sent => false,
            })
            .map(|(i, _)| i)
            .collect();
        due.sort_by_key(|&i| rows[i].created_at);
        due.truncate(limit.max(0) as usize);

        let mut claimed = Vec::with_capacity(due.len());
        for i in due {
            let row = &mut rows[i];
            row.status = OutboxStatus::Processing;
            row.processing_owner = Some(worker_id.to_string());
            row.processing_expires_at = Some(now + lease);
            claimed.push(ClaimedClickEvent {
                id: row.id,
                slug: row.slug.clone(),
                occurred_at: row.occurred_at,
                attempts: row.attempts,
                trace: row.trace.clone(),
            });
        }
        Ok(claimed)
    }

    async fn mark_sent(&self, id: Uuid, worker_id: &str) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|row| {
            row.id == id
                && row.status == OutboxStatus::Processing
                && row.processing_owner.as_deref() == Some(worker_id)
        });
        match row {
            Some(row) => {
                row.status = OutboxStatus::Sent;
                row.sent_at = Some(Utc::now());
                row.processing_owner = None;
                row.processing_expires_at = None;
                row.last_error = None;
                Ok(())
            }
            None => Err(AppError::not_owned(
                "Outbox event not owned by worker",
                json!({ "event_id": id }),
            )),
        }
    }

    async fn mark_retry(
        &self,
        id: Uuid,
        worker_id: &str,
        last_error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|row| {
            row.id == id
                && row.status == OutboxStatus::Processing
                && row.processing_owner.as_deref() == Some(worker_id)
        });
        match row {
            Some(row) => {
                row.status = OutboxStatus::Pending;
                row.attempts += 1;
                row.last_error = Some(last_error.to_string());
                row.next_attempt_at = next_attempt_at;
                row.processing_owner = None;
                row.processing_expires_at = None;
                Ok(())
            }
            None => Err(AppError::not_owned(
                "Outbox event not owned by worker",
                json!({ "event_id": id }),
            )),
        }
    }
}

// ── Aggregate store ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStatsRepository {
    counts: Mutex<HashMap<(String, NaiveDate), i64>>,
}

impl MemoryStatsRepository {
    pub fn seed(&self, slug: &str, day: NaiveDate, count: i64) {
        self.counts
            .lock()
            .unwrap()
            .insert((slug.to_string(), day), count);
    }

    pub fn bump(&self, slug: &str, day: NaiveDate) {
        *self
            .counts
            .lock()
            .unwrap()
            .entry((slug.to_string(), day))
            .or_insert(0) += 1;
    }

    pub fn count_for(&self, slug: &str, day: NaiveDate) -> i64 {
        self.counts
            .lock()
            .unwrap()
            .get(&(slug.to_string(), day))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl StatsRepository for MemoryStatsRepository {
    async fn get_daily(
        &self,
        slug: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>, AppError> {
        let counts = self.counts.lock().unwrap();
        let mut daily: Vec<DailyCount> = counts
            .iter()
            .filter(|((s, day), _)| s == slug && *day >= from && *day <= to)
            .map(|((_, day), count)| DailyCount {
                date: *day,
                count: *count,
            })
            .collect();
        daily.sort_by_key(|entry| entry.date);
        Ok(daily)
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<(), AppError> {
        self.counts.lock().unwrap().retain(|(s, _), _| s != slug);
        Ok(())
    }
}

/// Fake of the consumer-side transaction: dedup registry, conditional link
/// increment, and daily counter bump over the in-memory stores.
pub struct MemoryClickProcessor {
    pub links: Arc<MemoryLinkRepository>,
    pub stats: Arc<MemoryStatsRepository>,
    processed: Mutex<HashSet<String>>,
}

impl MemoryClickProcessor {
    pub fn new(links: Arc<MemoryLinkRepository>, stats: Arc<MemoryStatsRepository>) -> Self {
        Self {
            links,
            stats,
            processed: Mutex::new(HashSet::new()),
        }
    }

    pub fn processed_len(&self) -> usize {
        self.processed.lock().unwrap().len()
    }
}

#[async_trait]
impl ClickProcessor for MemoryClickProcessor {
    async fn apply(
        &self,
        event_id: &str,
        slug: &str,
        occurred_at: DateTime<Utc>,
    ) -> Result<ClickOutcome, AppError> {
        if !self.processed.lock().unwrap().insert(event_id.to_string()) {
            return Ok(ClickOutcome::AlreadyProcessed);
        }

        match self.links.find_active_and_increment(slug, occurred_at).await {
            Ok(_) => {
                self.stats.bump(slug, occurred_at.date_naive());
                Ok(ClickOutcome::Applied)
            }
            Err(AppError::NotFound { .. }) | Err(AppError::Expired { .. }) => {
                Ok(ClickOutcome::LinkGone)
            }
            Err(e) => Err(e),
        }
    }
}

// ── Broker ──────────────────────────────────────────────────────────────────

/// Publisher fake that records every message and can be switched to fail.
#[derive(Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<OutboundClick>>,
    failing: AtomicBool,
}

impl RecordingPublisher {
    pub fn messages(&self) -> Vec<OutboundClick> {
        self.messages.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClickPublisher for RecordingPublisher {
    async fn publish(&self, message: OutboundClick, _timeout: Duration) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::internal("broker unavailable", json!({})));
        }
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

// ── Wiring ──────────────────────────────────────────────────────────────────

pub struct TestContext {
    pub state: AppState,
    pub links: Arc<MemoryLinkRepository>,
    pub outbox: Arc<MemoryOutboxRepository>,
    pub stats: Arc<MemoryStatsRepository>,
}

pub fn test_context() -> TestContext {
    test_context_with_redirect(StatusCode::FOUND)
}

pub fn test_context_with_redirect(redirect_status: StatusCode) -> TestContext {
    let links = Arc::new(MemoryLinkRepository::default());
    let outbox = Arc::new(MemoryOutboxRepository::default());
    let stats = Arc::new(MemoryStatsRepository::default());

    let link_service = Arc::new(LinkService::new(
        links.clone(),
        outbox.clone(),
        stats.clone(),
        6,
    ));
    let stats_service = Arc::new(StatsService::new(links.clone(), stats.clone()));

    let state = AppState {
        link_service,
        stats_service,
        base_url: "http://sho.rt".to_string(),
        redirect_status,
    };

    TestContext {
        state,
        links,
        outbox,
        stats,
    }
}

/// Test server exposing the same routes as `routes::app_router`.
pub fn api_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/{slug}", get(redirect_handler))
        .route("/api/links", post(create_link_handler))
        .route("/api/links/{slug}", delete(delete_link_handler))
        .route("/api/links/{slug}/stats", get(stats_handler))
        .with_state(state);
    TestServer::new(app).unwrap()
}

pub fn active_link(slug: &str, url: &str) -> Link {
    Link {
        slug: slug.to_string(),
        url: url.to_string(),
        notes: None,
        api_key: None,
        clicks: 0,
        created_at: Utc::now(),
        expires_at: None,
    }
}

pub fn expired_link(slug: &str, url: &str, expires_at: DateTime<Utc>) -> Link {
    Link {
        expires_at: Some(expires_at),
        ..active_link(slug, url)
    }
}
