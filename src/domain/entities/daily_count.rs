//! Per-day click counter entry.

use chrono::NaiveDate;
use serde::Serialize;

/// One day of click counts for a slug.
///
/// Days are calendar dates in UTC. The stats endpoint returns a dense
/// sequence of these, with zero-count entries for days that have no row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}
