//! Parsing and formatting of event timestamps.
//!
//! Everything is stored as a UTC instant with second precision. Inputs
//! without an offset are taken to already be UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};

use crate::error::{InviteError, InviteResult};

/// Output pattern for DTSTART, DTEND, DTSTAMP and LAST-MODIFIED.
pub const ICS_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Naive date-time layouts accepted on input, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%SZ",
    "%Y%m%dT%H%M%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a date/time string into a UTC instant.
///
/// Accepts RFC 3339 (any offset, converted to UTC), the iCalendar basic
/// form `20240115T093000Z`, naive `YYYY-MM-DD HH:MM[:SS]` with either a
/// space or `T` separator, and a bare `YYYY-MM-DD` (midnight).
pub fn parse_datetime(input: &str) -> InviteResult<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).trunc_subsecs(0));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    Err(InviteError::Parse(format!(
        "'{}'. Expected RFC 3339, YYYYMMDDTHHMMSSZ or YYYY-MM-DD [HH:MM[:SS]]",
        input
    )))
}

/// Convert a Unix timestamp in seconds into a UTC instant.
pub fn from_unix_seconds(secs: i64) -> InviteResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| InviteError::Parse(format!("timestamp {} is out of range", secs)))
}

/// Format an instant as `YYYYMMDDTHHMMSSZ`.
pub fn format_ics_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(ICS_DATETIME_FORMAT).to_string()
}
