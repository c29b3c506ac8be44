//! Wire names shared with the server.

/// Metadata envelope embedded in every stored document.
pub const METADATA: &str = "@metadata";
pub const DOCUMENT_ID: &str = "@id";
pub const METADATA_ETAG: &str = "@etag";

pub const NON_AUTHORITATIVE_INFORMATION: &str = "Non-Authoritative-Information";
/// Relevance score attached by scored queries.
pub const TEMPORARY_SCORE_VALUE: &str = "Temp-Index-Score";

pub const LAST_MODIFIED: &str = "Last-Modified";
/// Default name of the store-specific last-modified field and header.
pub const RAVEN_LAST_MODIFIED: &str = "Raven-Last-Modified";
pub const ETAG: &str = "ETag";
/// Legacy textual request timing header.
pub const TEMP_REQUEST_TIME: &str = "Temp-Request-Time";
