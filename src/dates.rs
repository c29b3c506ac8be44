//! Date parsing for metadata fields and response headers.
//!
//! Two families of formats are understood:
//!
//! | Family | Examples |
//! |--------|----------|
//! | Store canonical | `2013-05-31T08:09:12.9187040`, `2013-05-31T08:09:12.918Z` |
//! | HTTP date | `Sun, 06 Nov 1994 08:49:37 GMT` (RFC 1123), `Sunday, 06-Nov-94 08:49:37 GMT` (RFC 850), `Sun Nov  6 08:49:37 1994` (asctime) |
//!
//! Zone-less store timestamps are taken as UTC.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

const STORE_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Parse the store's canonical date-time text.
pub fn parse_store_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, STORE_PARSE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse an HTTP date in any of the three historical layouts.
pub fn parse_http_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    [RFC850_FORMAT, ASCTIME_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Store format first, then HTTP dates.
pub fn parse_any_date(text: &str) -> Option<DateTime<Utc>> {
    parse_store_date(text).or_else(|| parse_http_date(text))
}

/// Render in the store layout: seven fractional digits (100ns ticks), no zone.
pub fn format_store_date(dt: &DateTime<Utc>) -> String {
    let ticks = dt.nanosecond().min(999_999_999) / 100;
    format!("{}.{:07}", dt.format("%Y-%m-%dT%H:%M:%S"), ticks)
}
