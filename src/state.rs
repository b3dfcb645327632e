//! Application state shared across HTTP handlers.
//!
//! Repositories are wrapped into services at construction time and passed in
//! as capability bundles; handlers never reach for process globals. Cloned
//! for each request via Axum's state extraction - cheap thanks to `Arc`.

use axum::http::StatusCode;
use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{LinkService, StatsService};
use crate::config::Config;
use crate::infrastructure::persistence::{
    PgClickOutboxRepository, PgLinkRepository, PgStatsRepository,
};

/// Shared application state injected into HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub stats_service: Arc<StatsService>,
    /// Prefix for `shortUrl` values in create responses.
    pub base_url: String,
    /// 301 or 302, per configuration.
    pub redirect_status: StatusCode,
}

impl AppState {
    /// Wires the PostgreSQL repositories into services.
    pub fn new(pool: Arc<PgPool>, config: &Config) -> Self {
        let link_repo = Arc::new(PgLinkRepository::new(pool.clone()));
        let outbox_repo = Arc::new(PgClickOutboxRepository::new(pool.clone()));
        let stats_repo = Arc::new(PgStatsRepository::new(pool));

        let link_service = Arc::new(LinkService::new(
            link_repo.clone(),
            outbox_repo,
            stats_repo.clone(),
            config.slug_length,
        ));
        let stats_service = Arc::new(StatsService::new(link_repo, stats_repo));

        Self {
            link_service,
            stats_service,
            base_url: config.base_url.clone(),
            redirect_status: config.redirect_status_code(),
        }
    }
}
