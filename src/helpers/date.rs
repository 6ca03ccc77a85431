//! Date helper functions
//!
//! Post dates are kept as the raw front-matter string; these helpers only
//! interpret them where a real timestamp is needed (feeds, `<time>` tags).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a front-matter date string in various formats.
///
/// Values without an offset are taken as UTC.
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Try RFC 3339 / ISO 8601 with offset first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// Format a date the way RSS `pubDate` expects (RFC 1123, GMT)
///
/// # Examples
/// ```ignore
/// rfc1123(&date) // -> "Mon, 15 Jan 2024 00:00:00 GMT"
/// ```
pub fn rfc1123(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Machine-readable form for `<time datetime="...">`, if the date parses
pub fn date_xml(s: &str) -> Option<String> {
    parse_date_string(s).map(|dt| dt.to_rfc3339())
}
