//! Index query results.
//!
//! The body fields `IsStale`, `IndexTimestamp`, `Results`, `Includes`,
//! `TotalResults`, `IndexName` and `SkippedResults` are part of the wire
//! contract and must be present. The index etag comes from a response
//! header and is passed in by the caller.

use serde_json::Value;

use crate::constants::TEMP_REQUEST_TIME;
use crate::error::{MaterializeError, Result};
use crate::etag::Etag;
use crate::extract::{optional, required, required_objects};
use crate::models::{Highlightings, JsonObject, QueryResult};

const HIGHLIGHTINGS: &str = "Highlightings";

/// Build a [`QueryResult`] from a query response body.
///
/// `duration_header` is the legacy `Temp-Request-Time` text; it is only
/// consulted when the body has no `DurationMilliseconds`.
pub fn query_result_from_json(
    json: &JsonObject,
    index_etag: Etag,
    duration_header: Option<&str>,
) -> Result<QueryResult> {
    let duration_milliseconds = match optional::<i64>(json, "DurationMilliseconds")? {
        Some(ms) => Some(ms),
        None => duration_header.map(parse_legacy_duration).transpose()?.flatten(),
    };

    Ok(QueryResult {
        is_stale: required(json, "IsStale")?,
        index_timestamp: required(json, "IndexTimestamp")?,
        index_etag,
        results: required_objects(json, "Results")?,
        includes: required_objects(json, "Includes")?,
        total_results: required(json, "TotalResults")?,
        index_name: required(json, "IndexName")?,
        skipped_results: required(json, "SkippedResults")?,
        highlightings: highlightings(json)?,
        non_authoritative_information: optional(json, "NonAuthoritativeInformation")?,
        duration_milliseconds,
    })
}

fn highlightings(json: &JsonObject) -> Result<Highlightings> {
    match json.get(HIGHLIGHTINGS) {
        None | Some(Value::Null) => Ok(Highlightings::new()),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(MaterializeError::Highlightings)
        }
    }
}

/// Read the legacy request-timing header as milliseconds.
///
/// Older servers send the timing as formatted text such as `"1,234.56"`.
/// Every `,` and `.` is deleted and the remaining digits are read as one
/// integer, so `"1,234.56"` gives `123456` and `"1.2.3"` gives `123`. This
/// is odd on purpose: it is what those servers expect clients to do, so do
/// not round or rescale it. Empty text means no timing.
pub fn parse_legacy_duration(text: &str) -> Result<Option<i64>> {
    if text.is_empty() {
        return Ok(None);
    }
    let digits: String = text.chars().filter(|c| *c != ',' && *c != '.').collect();
    digits
        .parse()
        .map(Some)
        .map_err(|e: std::num::ParseIntError| MaterializeError::InvalidHeader {
            header: TEMP_REQUEST_TIME.to_string(),
            value: text.to_string(),
            reason: e.to_string(),
        })
}
