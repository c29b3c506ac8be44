//! Domain records produced by materialization.
//!
//! Every record is a plain owned value built once per response. Nothing
//! here holds a reference back into the wire data it came from.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::constants::{
    DOCUMENT_ID, METADATA, METADATA_ETAG, NON_AUTHORITATIVE_INFORMATION, RAVEN_LAST_MODIFIED,
    TEMPORARY_SCORE_VALUE,
};
use crate::dates::format_store_date;
use crate::etag::Etag;

/// A JSON object node.
pub type JsonObject = serde_json::Map<String, Value>;

/// Field → fragment id → highlighted snippets.
pub type Highlightings = HashMap<String, HashMap<String, Vec<String>>>;

/// A stored document with its envelope split out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Document body. Never contains `@metadata`.
    pub data: JsonObject,
    /// User-visible metadata, reserved names removed.
    pub metadata: JsonObject,
    /// Empty when the server sent no id.
    pub key: String,
    pub etag: Etag,
    /// Always set for documents read from a JSON body; header-only
    /// responses may omit it.
    pub last_modified: Option<DateTime<Utc>>,
    pub non_authoritative_information: bool,
    /// Only present for results of a scored query. `None` is not `0.0`.
    pub temp_index_score: Option<f32>,
}

impl Document {
    /// Wire form: the body with an `@metadata` envelope.
    ///
    /// The last-modified timestamp is written under the default
    /// store-specific name. Use [`Materializer::document_to_json`] when the
    /// store name is configured.
    ///
    /// [`Materializer::document_to_json`]: crate::Materializer::document_to_json
    pub fn to_json(&self) -> JsonObject {
        self.to_json_with_store_field(RAVEN_LAST_MODIFIED)
    }

    /// Wire form with the last-modified timestamp under `store_last_modified`,
    /// in the store layout.
    pub fn to_json_with_store_field(&self, store_last_modified: &str) -> JsonObject {
        let mut metadata = self.metadata.clone();
        metadata.insert(DOCUMENT_ID.to_string(), Value::String(self.key.clone()));
        if !self.etag.is_empty() {
            metadata.insert(METADATA_ETAG.to_string(), Value::String(self.etag.to_string()));
        }
        if let Some(ref lm) = self.last_modified {
            metadata.insert(
                store_last_modified.to_string(),
                Value::String(format_store_date(lm)),
            );
        }
        if self.non_authoritative_information {
            metadata.insert(NON_AUTHORITATIVE_INFORMATION.to_string(), Value::Bool(true));
        }
        if let Some(score) = self.temp_index_score {
            metadata.insert(TEMPORARY_SCORE_VALUE.to_string(), Value::from(score));
        }

        let mut out = self.data.clone();
        out.insert(METADATA.to_string(), Value::Object(metadata));
        out
    }
}

/// Document metadata read without the body (HEAD-style responses).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub key: String,
    pub etag: Etag,
    /// `None` when the response carried no last-modified header.
    pub last_modified: Option<DateTime<Utc>>,
    pub metadata: JsonObject,
    pub non_authoritative_information: bool,
}

/// Aggregate result of an index query.
///
/// `results` and `includes` are raw objects; turning them into
/// [`Document`]s is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub is_stale: bool,
    pub index_timestamp: DateTime<Utc>,
    pub index_etag: Etag,
    pub results: Vec<JsonObject>,
    pub includes: Vec<JsonObject>,
    /// May exceed `results.len()` when the server truncated the page.
    pub total_results: i32,
    pub index_name: String,
    pub skipped_results: i32,
    pub highlightings: Highlightings,
    pub non_authoritative_information: Option<bool>,
    pub duration_milliseconds: Option<i64>,
}

/// Attachment descriptor. The payload is fetched by a separate call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub key: String,
    pub size: i64,
    pub metadata: JsonObject,
    pub etag: Etag,
    /// Whether the payload may be fetched in this context.
    pub can_get_data: bool,
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
}
