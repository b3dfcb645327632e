//! DTOs for the stats endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::entities::DailyCount;

/// Query parameters of `GET /api/links/{slug}/stats`.
///
/// Both bounds are required `YYYY-MM-DD` dates; parsing and presence are
/// checked in the handler so the error envelope stays consistent.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Response body: a dense per-day sequence over `[from, to]`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub slug: String,
    pub from: String,
    pub to: String,
    pub daily: Vec<DailyCount>,
}
