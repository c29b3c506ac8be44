//! Typed field access over loosely-typed JSON metadata and headers.
//!
//! Metadata objects coming from the server are not schema-checked, so every
//! read goes through [`MetadataValue::decode`] with an explicit shape guard:
//!
//! - absent field or JSON `null` → the caller's default
//! - array-shaped value → the caller's default, silently (see [`extract`])
//! - anything else → decoded, and a decode failure is a hard error
//!
//! The last-modified policy for both metadata objects and header maps lives
//! here as well, since it is just a prioritised pair of field reads.

use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde_json::Value;

use crate::constants::LAST_MODIFIED;
use crate::dates;
use crate::error::{MaterializeError, Result};
use crate::etag::Etag;
use crate::models::JsonObject;

/// A Rust type that a single JSON metadata value can be decoded into.
pub trait MetadataValue: Sized {
    /// Human-readable shape, used in error messages.
    const EXPECTED: &'static str;

    fn decode(field: &str, value: &Value) -> Result<Self>;
}

impl MetadataValue for String {
    const EXPECTED: &'static str = "string";

    fn decode(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(MaterializeError::invalid(field, Self::EXPECTED, other)),
        }
    }
}

impl MetadataValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn decode(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(MaterializeError::invalid(field, Self::EXPECTED, other)),
        }
    }
}

impl MetadataValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn decode(field: &str, value: &Value) -> Result<Self> {
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| MaterializeError::invalid(field, Self::EXPECTED, value))
    }
}

impl MetadataValue for i32 {
    const EXPECTED: &'static str = "32-bit integer";

    fn decode(field: &str, value: &Value) -> Result<Self> {
        i64::decode(field, value)
            .ok()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| MaterializeError::invalid(field, Self::EXPECTED, value))
    }
}

impl MetadataValue for f64 {
    const EXPECTED: &'static str = "number";

    fn decode(field: &str, value: &Value) -> Result<Self> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| MaterializeError::invalid(field, Self::EXPECTED, value))
    }
}

impl MetadataValue for f32 {
    const EXPECTED: &'static str = "number";

    fn decode(field: &str, value: &Value) -> Result<Self> {
        f64::decode(field, value).map(|v| v as f32)
    }
}

impl MetadataValue for Etag {
    const EXPECTED: &'static str = "etag";

    fn decode(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => s
                .parse()
                .map_err(|_| MaterializeError::invalid(field, Self::EXPECTED, value)),
            other => Err(MaterializeError::invalid(field, Self::EXPECTED, other)),
        }
    }
}

impl MetadataValue for DateTime<Utc> {
    const EXPECTED: &'static str = "date";

    fn decode(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => {
                dates::parse_any_date(s).ok_or_else(|| MaterializeError::InvalidDate {
                    field: field.to_string(),
                    value: s.clone(),
                })
            }
            other => Err(MaterializeError::invalid(field, Self::EXPECTED, other)),
        }
    }
}

impl MetadataValue for JsonObject {
    const EXPECTED: &'static str = "object";

    fn decode(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(map.clone()),
            other => Err(MaterializeError::invalid(field, Self::EXPECTED, other)),
        }
    }
}

/// Read `field` from an optional metadata object, falling back to `default`.
///
/// Array-shaped values are never valid scalar metadata; servers send them as
/// placeholders, so they resolve to `default` instead of failing.
pub fn extract<T: MetadataValue>(
    metadata: Option<&JsonObject>,
    field: &str,
    default: T,
) -> Result<T> {
    Ok(extract_optional(metadata, field)?.unwrap_or(default))
}

/// Like [`extract`], but reports absence as `None`.
pub fn extract_optional<T: MetadataValue>(
    metadata: Option<&JsonObject>,
    field: &str,
) -> Result<Option<T>> {
    let Some(value) = metadata.and_then(|m| m.get(field)) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => {
            tracing::trace!(field, len = items.len(), "array-shaped metadata value skipped");
            Ok(None)
        }
        other => T::decode(field, other).map(Some),
    }
}

/// A field that the wire contract guarantees. Absent or `null` is an error.
pub fn required<T: MetadataValue>(object: &JsonObject, field: &str) -> Result<T> {
    match object.get(field) {
        None | Some(Value::Null) => Err(MaterializeError::missing(field)),
        Some(value) => T::decode(field, value),
    }
}

/// An optional field with no shape leniency: present values must decode.
pub fn optional<T: MetadataValue>(object: &JsonObject, field: &str) -> Result<Option<T>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::decode(field, value).map(Some),
    }
}

/// A required array whose elements must all be JSON objects.
pub fn required_objects(object: &JsonObject, field: &str) -> Result<Vec<JsonObject>> {
    match object.get(field) {
        None | Some(Value::Null) => Err(MaterializeError::missing(field)),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| JsonObject::decode(field, item))
            .collect(),
        Some(other) => Err(MaterializeError::invalid(field, "array", other)),
    }
}

/// Last-modified of a document from its embedded metadata.
///
/// The store-specific field wins over `Last-Modified` and is read in the
/// store layout; `Last-Modified` is read as an HTTP date. A document with no
/// timestamp at all was just created server-side, so it gets "now".
pub fn last_modified_from_metadata(
    metadata: Option<&JsonObject>,
    store_field: &str,
) -> Result<DateTime<Utc>> {
    if let Some(dt) = metadata_date(metadata, store_field, dates::parse_store_date)? {
        return Ok(dt);
    }
    let fallback = metadata_date(metadata, LAST_MODIFIED, dates::parse_http_date)?;
    Ok(fallback.unwrap_or_else(Utc::now))
}

/// A date field parsed with one specific layout. Same absence and
/// array-skip rules as [`extract_optional`].
fn metadata_date(
    metadata: Option<&JsonObject>,
    field: &str,
    parse: fn(&str) -> Option<DateTime<Utc>>,
) -> Result<Option<DateTime<Utc>>> {
    let Some(text) = extract_optional::<String>(metadata, field)? else {
        return Ok(None);
    };
    parse(&text)
        .map(Some)
        .ok_or(MaterializeError::InvalidDate {
            field: field.to_string(),
            value: text,
        })
}

/// Last-modified from response headers; `None` when neither header is sent.
///
/// The store header is parsed in the store layout, `Last-Modified` as an
/// HTTP date. A present but malformed value is an error.
pub fn last_modified_from_headers(
    headers: &HeaderMap,
    store_header: &str,
) -> Result<Option<DateTime<Utc>>> {
    if let Some(text) = header_text(headers, store_header)?.filter(|t| !t.is_empty()) {
        return dates::parse_store_date(text)
            .map(Some)
            .ok_or_else(|| MaterializeError::InvalidDate {
                field: store_header.to_string(),
                value: text.to_string(),
            });
    }
    if let Some(text) = header_text(headers, LAST_MODIFIED)?.filter(|t| !t.is_empty()) {
        return dates::parse_http_date(text)
            .map(Some)
            .ok_or_else(|| MaterializeError::InvalidDate {
                field: LAST_MODIFIED.to_string(),
                value: text.to_string(),
            });
    }
    Ok(None)
}

/// First value of a header as text. Non-visible-ASCII values are rejected.
pub fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    value
        .to_str()
        .map(Some)
        .map_err(|e| MaterializeError::InvalidHeader {
            header: name.to_string(),
            value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            reason: e.to_string(),
        })
}
