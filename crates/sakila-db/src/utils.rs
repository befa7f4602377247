//! Shared utility functions

use chrono::{DateTime, Utc};

/// Parse an RFC3339 timestamp column, falling back to the current time
///
/// Rows written by this crate always carry RFC3339 strings; the fallback
/// only matters for rows inserted by hand into a seeded database.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
