use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ProcessingError, Result};

/// The day before `now`, in UTC. A run processes the previous full day by default.
pub fn previous_utc_day(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::days(1)).date_naive()
}

/// Parse a `YYYY-MM-DD` target day
pub fn parse_target_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ProcessingError::configuration(format!("Invalid target date '{}': {}", value, e))
    })
}

/// Parse an observation timestamp into a UTC instant.
///
/// RFC 3339 strings keep their offset; naive timestamps are taken as UTC.
pub fn parse_utc_instant(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(ProcessingError::aggregation(format!(
        "Malformed timestamp '{}'",
        value
    )))
}
