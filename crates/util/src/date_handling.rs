//! # Date Handling Utilities
//!
//! Parsing of caller-supplied timestamps into the UTC instants the Prefect
//! filter endpoints expect.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{input}' is not an RFC 3339 timestamp or a YYYY-MM-DD date")]
pub struct TimestampParseError {
    pub input: String,
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
///
/// Offsets are converted to UTC; a bare date means midnight UTC.
///
/// # Example
/// ```rust
/// use prefect_mcp_util::date_handling::parse_timestamp;
///
/// let instant = parse_timestamp("2024-05-01T12:00:00+02:00").unwrap();
/// assert_eq!(instant.to_rfc3339(), "2024-05-01T10:00:00+00:00");
///
/// let midnight = parse_timestamp("2024-05-01").unwrap();
/// assert_eq!(midnight.to_rfc3339(), "2024-05-01T00:00:00+00:00");
/// ```
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    let trimmed = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampParseError { input: input.to_string() })
}
