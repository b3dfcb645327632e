//! Handler for short URL redirect - the hot path.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::domain::trace_context::TraceContext;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a slug to its destination URL.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Request Flow
///
/// 1. Look up the link and check its expiration in memory
/// 2. Append the click event to the outbox, in-request, with the trace
///    headers of the incoming request
/// 3. Answer with the configured redirect status and `Location`
///
/// The outbox append is synchronous on purpose: once the 3xx is on the
/// wire, the click is already durable. Broker or aggregate-store outages do
/// not touch this path - only the link and outbox tables are involved.
///
/// # Errors
///
/// Returns a bare 404 for an unknown slug, a bare 410 for an expired one,
/// and 500 when the lookup or the outbox append fails.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let trace = TraceContext::from_headers(&headers);

    match state.link_service.resolve(&slug, trace).await {
        Ok(link) => (state.redirect_status, [(header::LOCATION, link.url)]).into_response(),
        Err(AppError::NotFound { .. }) => StatusCode::NOT_FOUND.into_response(),
        Err(AppError::Expired { .. }) => StatusCode::GONE.into_response(),
        Err(e) => {
            tracing::error!(error = %e, slug, "Failed to resolve slug");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
