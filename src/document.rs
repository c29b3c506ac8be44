//! Documents and document metadata.
//!
//! Two wire shapes carry a document:
//!
//! - a JSON object with an embedded `@metadata` envelope (query results,
//!   multi-gets), handled by [`Materializer::document_from_json`];
//! - a bare JSON body whose metadata travels in response headers (single
//!   document GET/HEAD), handled by [`Materializer::document_from_response`]
//!   and [`Materializer::metadata_from_headers`].
//!
//! Inputs are borrowed and never modified; the body is copied before the
//! envelope is removed.

use http::{HeaderMap, StatusCode};
use serde_json::Value;

use crate::config::Config;
use crate::constants::{
    DOCUMENT_ID, ETAG, METADATA, METADATA_ETAG, NON_AUTHORITATIVE_INFORMATION,
    TEMPORARY_SCORE_VALUE,
};
use crate::error::{MaterializeError, Result};
use crate::etag::Etag;
use crate::extract::{
    extract, extract_optional, header_text, last_modified_from_headers,
    last_modified_from_metadata,
};
use crate::headers::HeaderFilter;
use crate::models::{Document, DocumentMetadata, JsonObject};

/// Stateless converter from wire data to documents.
///
/// Holds only configuration; share one instance freely across threads.
#[derive(Debug, Clone)]
pub struct Materializer {
    filter: HeaderFilter,
    store_last_modified: String,
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Materializer {
    /// Names are trimmed, so a config built in code without
    /// [`Config::validate`] still matches the headers it names.
    pub fn new(config: &Config) -> Self {
        let store_last_modified = config.dates.store_last_modified.trim().to_string();
        let mut ignored: Vec<String> = config
            .metadata
            .extra_ignored_headers
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        ignored.push(store_last_modified.clone());
        Self {
            filter: HeaderFilter::new(&ignored, config.metadata.parse_structured_header_values),
            store_last_modified,
        }
    }

    pub fn filter(&self) -> &HeaderFilter {
        &self.filter
    }

    /// Build a [`Document`] from an object carrying an `@metadata` envelope.
    ///
    /// A missing envelope is legal and yields an empty key, the empty etag,
    /// and a last-modified of "now".
    pub fn document_from_json(&self, json: &JsonObject) -> Result<Document> {
        let mut data = json.clone();
        let metadata = match data.remove(METADATA) {
            None | Some(Value::Null) => None,
            Some(Value::Object(m)) => Some(m),
            Some(other) => return Err(MaterializeError::invalid(METADATA, "object", &other)),
        };
        let meta = metadata.as_ref();

        let key = extract(meta, DOCUMENT_ID, String::new())?;
        let last_modified = last_modified_from_metadata(meta, &self.store_last_modified)?;
        let etag = extract(meta, METADATA_ETAG, Etag::empty())?;
        let non_authoritative_information = extract(meta, NON_AUTHORITATIVE_INFORMATION, false)?;
        let temp_index_score = extract_optional(meta, TEMPORARY_SCORE_VALUE)?;

        Ok(Document {
            data,
            metadata: meta
                .map(|m| self.filter_metadata(m))
                .unwrap_or_default(),
            key,
            etag,
            last_modified: Some(last_modified),
            non_authoritative_information,
            temp_index_score,
        })
    }

    /// Map each element through [`document_from_json`](Self::document_from_json).
    ///
    /// Absent elements stay absent at the same position.
    pub fn documents_from_json(
        &self,
        items: &[Option<JsonObject>],
    ) -> Result<Vec<Option<Document>>> {
        items
            .iter()
            .map(|item| item.as_ref().map(|doc| self.document_from_json(doc)).transpose())
            .collect()
    }

    /// Same as [`documents_from_json`](Self::documents_from_json) over a JSON
    /// array node whose elements are objects or `null`.
    pub fn documents_from_array(&self, json: &Value) -> Result<Vec<Option<Document>>> {
        let Value::Array(items) = json else {
            return Err(MaterializeError::invalid("documents", "array", json));
        };
        items
            .iter()
            .map(|item| match item {
                Value::Null => Ok(None),
                Value::Object(doc) => self.document_from_json(doc).map(Some),
                other => Err(MaterializeError::invalid("documents", "object or null", other)),
            })
            .collect()
    }

    /// Metadata of `key` from response headers alone.
    pub fn metadata_from_headers(
        &self,
        key: &str,
        headers: &HeaderMap,
        status: StatusCode,
    ) -> Result<DocumentMetadata> {
        Ok(DocumentMetadata {
            key: key.to_string(),
            etag: self.etag_from_headers(headers),
            last_modified: last_modified_from_headers(headers, &self.store_last_modified)?,
            metadata: self.filter.filter_headers(headers),
            non_authoritative_information: status == StatusCode::NON_AUTHORITATIVE_INFORMATION,
        })
    }

    /// A document whose body is `body` verbatim and whose metadata is in headers.
    pub fn document_from_response(
        &self,
        key: &str,
        body: &Value,
        headers: &HeaderMap,
        status: StatusCode,
    ) -> Result<Document> {
        let Value::Object(data) = body else {
            return Err(MaterializeError::invalid("body", "object", body));
        };
        let meta = self.metadata_from_headers(key, headers, status)?;
        Ok(Document {
            data: data.clone(),
            metadata: meta.metadata,
            key: meta.key,
            etag: meta.etag,
            last_modified: meta.last_modified,
            non_authoritative_information: meta.non_authoritative_information,
            temp_index_score: None,
        })
    }

    /// Wire form of `doc`, readable back by [`document_from_json`](Self::document_from_json).
    pub fn document_to_json(&self, doc: &Document) -> JsonObject {
        doc.to_json_with_store_field(&self.store_last_modified)
    }

    pub fn filter_metadata(&self, metadata: &JsonObject) -> JsonObject {
        self.filter.filter_metadata(metadata)
    }

    fn etag_from_headers(&self, headers: &HeaderMap) -> Etag {
        match header_text(headers, ETAG) {
            Ok(text) => Etag::from_header(text),
            Err(e) => {
                tracing::debug!(error = %e, "non-text ETag header, using empty etag");
                Etag::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use http::HeaderValue;
    use serde_json::json;

    fn obj(v: Value) -> JsonObject {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    fn stored_doc() -> JsonObject {
        obj(json!({
            "Name": "Ayende",
            "Age": 30,
            "@metadata": {
                "@id": "users/1",
                "@etag": "01000000-0000-0001-0000-000000000007",
                "Raven-Entity-Name": "Users",
                "Raven-Last-Modified": "2013-05-31T08:09:12.0000000",
                "Non-Authoritative-Information": true,
                "Temp-Index-Score": 0.75
            }
        }))
    }

    #[test]
    fn test_document_from_json() {
        let doc = Materializer::default().document_from_json(&stored_doc()).unwrap();
        assert_eq!(doc.key, "users/1");
        assert_eq!(doc.etag, Etag::new(0x0100_0000_0000_0001, 7));
        assert_eq!(
            doc.last_modified,
            Some(Utc.with_ymd_and_hms(2013, 5, 31, 8, 9, 12).unwrap())
        );
        assert!(doc.non_authoritative_information);
        assert_eq!(doc.temp_index_score, Some(0.75));
        assert_eq!(doc.data, obj(json!({"Name": "Ayende", "Age": 30})));
        assert_eq!(doc.metadata["Raven-Entity-Name"], json!("Users"));
        assert!(!doc.metadata.contains_key("Temp-Index-Score"));
        assert!(!doc.metadata.contains_key("Raven-Last-Modified"));
    }

    #[test]
    fn test_input_is_not_modified() {
        let input = stored_doc();
        let before = input.clone();
        Materializer::default().document_from_json(&input).unwrap();
        assert_eq!(input, before);
        assert!(input.contains_key("@metadata"));
    }

    #[test]
    fn test_document_without_metadata() {
        let doc = Materializer::default()
            .document_from_json(&obj(json!({"Name": "x"})))
            .unwrap();
        assert_eq!(doc.key, "");
        assert!(doc.etag.is_empty());
        assert!(!doc.non_authoritative_information);
        assert!(doc.last_modified.is_some());
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.temp_index_score, None);
    }

    #[test]
    fn test_array_id_falls_back_to_empty_key() {
        let doc = Materializer::default()
            .document_from_json(&obj(json!({"@metadata": {"@id": ["users/1"]}})))
            .unwrap();
        assert_eq!(doc.key, "");
    }

    #[test]
    fn test_non_object_metadata_is_error() {
        let err = Materializer::default()
            .document_from_json(&obj(json!({"@metadata": "oops"})))
            .unwrap_err();
        assert_eq!(err.field(), Some("@metadata"));
    }

    #[test]
    fn test_documents_preserve_positions() {
        let m = Materializer::default();
        let items = vec![Some(stored_doc()), None, Some(obj(json!({"a": 1}))), None];
        let docs = m.documents_from_json(&items).unwrap();
        assert_eq!(docs.len(), 4);
        assert_eq!(docs[0].as_ref().unwrap().key, "users/1");
        assert!(docs[1].is_none());
        assert_eq!(docs[2].as_ref().unwrap().key, "");
        assert!(docs[3].is_none());
    }

    #[test]
    fn test_documents_from_array() {
        let m = Materializer::default();
        let docs = m
            .documents_from_array(&json!([null, {"@metadata": {"@id": "a/1"}}]))
            .unwrap();
        assert!(docs[0].is_none());
        assert_eq!(docs[1].as_ref().unwrap().key, "a/1");

        assert!(m.documents_from_array(&json!([1])).is_err());
        assert!(m.documents_from_array(&json!({})).is_err());
    }

    fn response_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "etag",
            HeaderValue::from_static("\"01000000-0000-0001-0000-000000000003\""),
        );
        headers.insert(
            "last-modified",
            HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"),
        );
        headers.insert("raven-entity-name", HeaderValue::from_static("Users"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn test_metadata_from_headers() {
        let meta = Materializer::default()
            .metadata_from_headers("users/1", &response_headers(), StatusCode::OK)
            .unwrap();
        assert_eq!(meta.key, "users/1");
        assert_eq!(meta.etag, Etag::new(0x0100_0000_0000_0001, 3));
        assert_eq!(
            meta.last_modified,
            Some(Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap())
        );
        assert!(!meta.non_authoritative_information);
        assert_eq!(meta.metadata, obj(json!({"Raven-Entity-Name": "Users"})));
    }

    #[test]
    fn test_metadata_from_headers_non_authoritative() {
        let meta = Materializer::default()
            .metadata_from_headers(
                "users/1",
                &HeaderMap::new(),
                StatusCode::NON_AUTHORITATIVE_INFORMATION,
            )
            .unwrap();
        assert!(meta.non_authoritative_information);
        assert!(meta.etag.is_empty());
        assert_eq!(meta.last_modified, None);
    }

    #[test]
    fn test_metadata_from_headers_bad_etag_is_empty() {
        let mut headers = HeaderMap::new();
        headers.insert("etag", HeaderValue::from_static("\"v1\""));
        let meta = Materializer::default()
            .metadata_from_headers("k", &headers, StatusCode::OK)
            .unwrap();
        assert!(meta.etag.is_empty());
    }

    #[test]
    fn test_document_from_response_keeps_body() {
        let body = json!({"Name": "x", "@metadata": {"@id": "ignored"}});
        let doc = Materializer::default()
            .document_from_response("users/9", &body, &response_headers(), StatusCode::OK)
            .unwrap();
        assert_eq!(doc.key, "users/9");
        assert!(doc.data.contains_key("@metadata"));
        assert_eq!(doc.etag.changes(), 3);
        assert_eq!(doc.temp_index_score, None);

        assert!(Materializer::default()
            .document_from_response("k", &json!([]), &HeaderMap::new(), StatusCode::OK)
            .is_err());
    }

    #[test]
    fn test_round_trip_with_custom_store_last_modified() {
        let mut config = Config::default();
        config.dates.store_last_modified = "Store-Last-Modified".to_string();
        let m = Materializer::new(&config);

        let mut doc = m.document_from_json(&stored_doc()).unwrap();
        doc.last_modified = Some(Utc.with_ymd_and_hms(2014, 1, 2, 3, 4, 5).unwrap());

        let wire = m.document_to_json(&doc);
        assert!(wire["@metadata"]
            .as_object()
            .unwrap()
            .contains_key("Store-Last-Modified"));
        let back = m.document_from_json(&wire).unwrap();
        assert_eq!(back.last_modified, doc.last_modified);
        assert!(!back.metadata.contains_key("Store-Last-Modified"));
    }

    #[test]
    fn test_padded_config_names_are_trimmed() {
        let mut config = Config::default();
        config.dates.store_last_modified = " Store-Lm ".to_string();
        config.metadata.extra_ignored_headers = vec![" X-Trace ".to_string()];
        let m = Materializer::new(&config);

        let mut headers = HeaderMap::new();
        headers.insert(
            "store-lm",
            HeaderValue::from_static("2013-05-31T08:09:12.0000000"),
        );
        headers.insert("x-trace", HeaderValue::from_static("abc"));
        let meta = m.metadata_from_headers("k", &headers, StatusCode::OK).unwrap();
        assert!(meta.metadata.is_empty());
        assert_eq!(
            meta.last_modified,
            Some(Utc.with_ymd_and_hms(2013, 5, 31, 8, 9, 12).unwrap())
        );
    }

    #[test]
    fn test_custom_store_last_modified_name() {
        let mut config = Config::default();
        config.dates.store_last_modified = "Store-Last-Modified".to_string();
        let m = Materializer::new(&config);

        let mut headers = HeaderMap::new();
        headers.insert(
            "store-last-modified",
            HeaderValue::from_static("2013-05-31T08:09:12.0000000"),
        );
        let meta = m.metadata_from_headers("k", &headers, StatusCode::OK).unwrap();
        assert!(meta.metadata.is_empty());
        assert_eq!(
            meta.last_modified,
            Some(Utc.with_ymd_and_hms(2013, 5, 31, 8, 9, 12).unwrap())
        );
    }
}
