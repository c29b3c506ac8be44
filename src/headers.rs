//! User-visible metadata from headers and metadata objects.
//!
//! The server mixes document metadata with transport bookkeeping in the
//! same namespace. [`HeaderFilter`] drops the bookkeeping names, re-cases
//! the rest (`raven-entity-name` → `Raven-Entity-Name`) and, for headers,
//! turns text values back into JSON.

use std::collections::HashSet;

use http::HeaderMap;
use serde_json::Value;

use crate::models::JsonObject;

/// Names that never reach user-visible metadata. Compared case-insensitively.
pub const RESERVED_HEADERS: &[&str] = &[
    // store bookkeeping
    "Raven-Server-Build",
    "Raven-Last-Modified",
    "Raven-Authenticated-User",
    "Raven-Timer-Request",
    "Non-Authoritative-Information",
    "Has-Api-Key",
    "Persistent-Auth",
    "Reverse-Via",
    "IsStale",
    // CORS
    "Access-Control-Allow-Origin",
    "Access-Control-Max-Age",
    "Access-Control-Allow-Methods",
    "Access-Control-Request-Headers",
    "Access-Control-Allow-Headers",
    // entity headers
    "Allow",
    "Content-Disposition",
    "Content-Encoding",
    "Content-Language",
    "Content-Location",
    "Content-MD5",
    "Content-Range",
    "Content-Type",
    "Content-Length",
    "Expires",
    "Last-Modified",
    "Link",
    // request headers
    "Accept",
    "Accept-Charset",
    "Accept-Encoding",
    "Accept-Language",
    "Authorization",
    "Cookie",
    "Expect",
    "From",
    "Host",
    "If-Match",
    "If-Modified-Since",
    "If-None-Match",
    "If-Range",
    "If-Unmodified-Since",
    "Max-Forwards",
    "Referer",
    "TE",
    "User-Agent",
    // response headers
    "Accept-Ranges",
    "Age",
    "ETag",
    "Location",
    "Retry-After",
    "Server",
    "Set-Cookie",
    "Set-Cookie2",
    "Vary",
    "WWW-Authenticate",
    // general headers
    "Cache-Control",
    "Connection",
    "Date",
    "Keep-Alive",
    "Pragma",
    "Trailer",
    "Transfer-Encoding",
    "Upgrade",
    "Via",
    "Warning",
    // proxies and hosting
    "X-ARR-LOG-ID",
    "X-ARR-SSL",
    "X-Forwarded-For",
    "X-Original-URL",
    "X-AspNet-Version",
    "X-Powered-By",
    "X-SourceFiles",
];

/// Per-request scratch values (`Temp-Index-Score`, `Temp-Request-Time`, ...).
const TEMP_PREFIX: &str = "temp-";

/// Filters reserved names out of header maps and metadata objects.
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    ignored: HashSet<String>,
    parse_structured_values: bool,
}

impl Default for HeaderFilter {
    fn default() -> Self {
        Self::new(&[], true)
    }
}

impl HeaderFilter {
    /// Built-in reserved names plus `extra`, trimmed.
    pub fn new(extra: &[String], parse_structured_values: bool) -> Self {
        let ignored = RESERVED_HEADERS
            .iter()
            .copied()
            .chain(extra.iter().map(|h| h.trim()))
            .map(str::to_ascii_lowercase)
            .collect();
        Self {
            ignored,
            parse_structured_values,
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        lower.starts_with(TEMP_PREFIX) || self.ignored.contains(&lower)
    }

    /// Metadata mapping from response headers.
    ///
    /// A header sent more than once becomes a JSON array of its values.
    pub fn filter_headers(&self, headers: &HeaderMap) -> JsonObject {
        let mut out = JsonObject::new();
        for name in headers.keys() {
            if self.is_reserved(name.as_str()) {
                continue;
            }
            let mut values: Vec<Value> = headers
                .get_all(name)
                .iter()
                .map(|v| self.header_value(&String::from_utf8_lossy(v.as_bytes())))
                .collect();
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            out.insert(capture_header_name(name.as_str()), value);
        }
        out
    }

    /// Metadata mapping from an embedded `@metadata` object. Values are kept as-is.
    ///
    /// Keys that re-case to the same name (`foo-bar`, `Foo-Bar`) collapse
    /// into one entry holding the value of the first in object order.
    pub fn filter_metadata(&self, metadata: &JsonObject) -> JsonObject {
        let mut out = JsonObject::new();
        for (key, value) in metadata {
            if self.is_reserved(key) {
                continue;
            }
            out.entry(capture_header_name(key))
                .or_insert_with(|| value.clone());
        }
        out
    }

    fn header_value(&self, text: &str) -> Value {
        let trimmed = text.trim();
        if self.parse_structured_values && (trimmed.starts_with('{') || trimmed.starts_with('[')) {
            match serde_json::from_str(trimmed) {
                Ok(value) => return value,
                Err(e) => {
                    tracing::trace!(error = %e, "structured-looking header value kept as text");
                }
            }
        }
        Value::String(text.to_string())
    }
}

/// Upper-case the first character and every character after a `-`.
pub fn capture_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_dash = true;
    for ch in name.chars() {
        if last_was_dash {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        last_was_dash = ch == '-';
    }
    out
}
