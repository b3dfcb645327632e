//! Handlers for link creation and deletion.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::api::dto::envelope::{success, success_codes, CorrelationId, Failure};
use crate::api::dto::links::{CreateLinkRequest, DeleteLinkResponse, LinkResponse};
use crate::application::services::CreateLinkInput;
use crate::error::AppError;
use crate::state::AppState;

/// Header whose value is stored on the link as an attribution tag.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Errors
///
/// - `400 INVALID_REQUEST` - malformed body or `expiresAt` in the past
/// - `400 INVALID_URL` - destination fails URL validation
/// - `500 INTERNAL_ERROR` - storage failure or slug-space exhaustion
pub async fn create_link_handler(
    State(state): State<AppState>,
    correlation: CorrelationId,
    headers: HeaderMap,
    body: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<Response, Failure> {
    let Json(request) = body.map_err(|rejection| {
        correlation.failure(AppError::bad_request(
            "Invalid request body",
            json!({ "cause": rejection.body_text() }),
        ))
    })?;

    request.validate().map_err(|errors| {
        let error = if errors.field_errors().contains_key("url") {
            AppError::invalid_url("Invalid URL", json!({ "cause": errors.to_string() }))
        } else {
            AppError::bad_request("Invalid request body", json!({ "cause": errors.to_string() }))
        };
        correlation.failure(error)
    })?;

    if let Some(expires_at) = request.expires_at {
        if expires_at <= Utc::now() {
            return Err(correlation.failure(AppError::bad_request(
                "expiresAt must be in the future",
                json!({ "expires_at": expires_at }),
            )));
        }
    }

    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let link = state
        .link_service
        .create_link(CreateLinkInput {
            url: request.url,
            notes: request.notes,
            expires_at: request.expires_at,
            api_key,
        })
        .await
        .map_err(|e| {
            if matches!(e, AppError::Conflict { .. } | AppError::Internal { .. }) {
                tracing::error!(error = %e, "Failed to create link");
            }
            correlation.failure(e)
        })?;

    Ok(success(
        &correlation,
        StatusCode::CREATED,
        success_codes::LINK_CREATED,
        LinkResponse::from_link(link, &state.base_url),
    ))
}

/// Deletes a link and its daily counters.
///
/// # Endpoint
///
/// `DELETE /api/links/{slug}`
///
/// # Errors
///
/// - `404 LINK_NOT_FOUND` - no link matches the slug
pub async fn delete_link_handler(
    State(state): State<AppState>,
    correlation: CorrelationId,
    Path(slug): Path<String>,
) -> Result<Response, Failure> {
    state
        .link_service
        .delete_link(&slug)
        .await
        .map_err(|e| correlation.failure(e))?;

    Ok(success(
        &correlation,
        StatusCode::OK,
        success_codes::LINK_DELETED,
        DeleteLinkResponse { slug },
    ))
}
