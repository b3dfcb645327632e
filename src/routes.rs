//! Router configuration.

use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::handlers::{
    create_link_handler, delete_link_handler, redirect_handler, stats_handler,
};
use crate::state::AppState;

/// Constructs the application router.
///
/// # Route Structure
///
/// - `/{slug}` - redirect endpoint (public)
/// - `/health` - liveness probe
/// - `/api/links` - create
/// - `/api/links/{slug}` - delete
/// - `/api/links/{slug}/stats` - daily stats
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = Router::new()
        .route("/links", post(create_link_handler))
        .route("/links/{slug}", delete(delete_link_handler))
        .route("/links/{slug}/stats", get(stats_handler));

    let router = Router::new()
        .route("/{slug}", get(redirect_handler))
        .route("/health", get(|| async { StatusCode::OK }))
        .nest("/api", api_router)
        .with_state(state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
