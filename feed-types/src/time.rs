//! Timestamp parsing for `created_at` fields.
//!
//! The server emits ISO 8601 timestamps, sometimes with fractional seconds
//! and sometimes without. A timestamp that cannot be parsed is treated the
//! same as a missing one.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Offset-less layouts tried after RFC 3339, strictest first.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Parse a server timestamp.
///
/// Tries the internet date-time form (with or without fractional seconds)
/// first, then offset-less forms interpreted as UTC. Returns `None` for
/// anything else, including empty strings.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
