//! Attachment listings.

use serde_json::Value;

use crate::error::{MaterializeError, Result};
use crate::etag::Etag;
use crate::extract::{optional, required};
use crate::models::{Attachment, JsonObject};

/// Build descriptors from a JSON array of attachment entries.
///
/// `Key` and `Size` are required; `Metadata` and `Etag` default to an empty
/// object and the empty etag. The payload is never populated here:
/// `can_read_data` only records whether a later fetch is allowed.
pub fn attachments_from_json(json: &Value, can_read_data: bool) -> Result<Vec<Attachment>> {
    let Value::Array(items) = json else {
        return Err(MaterializeError::invalid("attachments", "array", json));
    };
    items
        .iter()
        .map(|item| match item {
            Value::Object(entry) => attachment(entry, can_read_data),
            other => Err(MaterializeError::invalid("attachments", "object", other)),
        })
        .collect()
}

fn attachment(entry: &JsonObject, can_read_data: bool) -> Result<Attachment> {
    Ok(Attachment {
        key: required(entry, "Key")?,
        size: required(entry, "Size")?,
        metadata: optional(entry, "Metadata")?.unwrap_or_default(),
        etag: optional(entry, "Etag")?.unwrap_or_else(Etag::empty),
        can_get_data: can_read_data,
        data: None,
    })
}
