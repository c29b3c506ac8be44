//! Error taxonomy for materialization.
//!
//! Only hard failures live here. Absent optional fields and array-shaped
//! metadata values resolve to defaults and never produce an error.

use thiserror::Error;

/// A wire value that could not be turned into a domain record.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}`: expected {expected}, found {found}")]
    InvalidField {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("field `{field}`: unparseable date `{value}`")]
    InvalidDate { field: String, value: String },

    #[error("header `{header}`: invalid value `{value}`: {reason}")]
    InvalidHeader {
        header: String,
        value: String,
        reason: String,
    },

    #[error("unable to read highlightings: {0}")]
    Highlightings(#[source] serde_json::Error),
}

impl MaterializeError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, expected: &'static str, found: &serde_json::Value) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            expected,
            found: describe(found),
        }
    }

    /// Name of the field or header the error is about, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field }
            | Self::InvalidField { field, .. }
            | Self::InvalidDate { field, .. } => Some(field.as_str()),
            Self::InvalidHeader { header, .. } => Some(header.as_str()),
            Self::Highlightings(_) => None,
        }
    }
}

/// Short rendering of a JSON node for error messages.
fn describe(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s.chars().take(64).collect::<String>()),
        Value::Array(a) => format!("array of {}", a.len()),
        Value::Object(_) => "object".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, MaterializeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_field_message_names_field() {
        let err = MaterializeError::invalid("TotalResults", "integer", &json!("abc"));
        assert_eq!(err.field(), Some("TotalResults"));
        assert_eq!(
            err.to_string(),
            "field `TotalResults`: expected integer, found string \"abc\""
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = MaterializeError::missing("Results");
        assert_eq!(err.to_string(), "missing required field `Results`");
    }
}
