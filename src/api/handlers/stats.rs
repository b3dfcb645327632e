//! Handler for per-day click statistics.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use chrono::NaiveDate;
use serde_json::json;

use crate::api::dto::envelope::{success, success_codes, CorrelationId, Failure};
use crate::api::dto::stats::{StatsQuery, StatsResponse};
use crate::error::AppError;
use crate::state::AppState;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns daily click counts for a slug over an inclusive date range.
///
/// # Endpoint
///
/// `GET /api/links/{slug}/stats?from=YYYY-MM-DD&to=YYYY-MM-DD`
///
/// The response contains exactly `to - from + 1` entries, one per calendar
/// day in order, with zeroes for days that saw no clicks. Expired links are
/// still queryable.
///
/// # Errors
///
/// - `400 INVALID_REQUEST` - missing/malformed dates or `from > to`
/// - `404 LINK_NOT_FOUND` - unknown slug
pub async fn stats_handler(
    State(state): State<AppState>,
    correlation: CorrelationId,
    Path(slug): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Response, Failure> {
    let from_raw = query.from.unwrap_or_default();
    let to_raw = query.to.unwrap_or_default();
    if from_raw.is_empty() || to_raw.is_empty() {
        return Err(correlation.failure(AppError::bad_request(
            "from and to are required (YYYY-MM-DD)",
            json!({}),
        )));
    }

    let from = parse_date(&from_raw, "from").map_err(|e| correlation.failure(e))?;
    let to = parse_date(&to_raw, "to").map_err(|e| correlation.failure(e))?;

    let daily = state
        .stats_service
        .daily_stats(&slug, from, to)
        .await
        .map_err(|e| correlation.failure(e))?;

    Ok(success(
        &correlation,
        StatusCode::OK,
        success_codes::STATS_FOUND,
        StatsResponse {
            slug,
            from: from.format(DATE_FORMAT).to_string(),
            to: to.format(DATE_FORMAT).to_string(),
            daily,
        },
    ))
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        AppError::bad_request(
            format!("invalid {} (YYYY-MM-DD)", field),
            json!({ "field": field, "value": raw }),
        )
    })
}
