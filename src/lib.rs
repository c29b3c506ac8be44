//! # Docstore Materialize
//!
//! Response materialization for a document-store client.
//!
//! The transport hands over parsed JSON and a header map; this crate turns
//! them into typed, always-valid records. Optional fields fall back to
//! documented defaults, array-shaped metadata placeholders are skipped, and
//! anything malformed surfaces as a [`MaterializeError`] naming the field.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌─────────────────────┐
//! │  Transport   │──▶│   extract /   │──▶│ Document            │
//! │ JSON+headers │   │ headers/dates │   │ DocumentMetadata    │
//! └──────────────┘   └───────────────┘   │ QueryResult         │
//!                                        │ Attachment          │
//!                                        └─────────────────────┘
//! ```
//!
//! All operations are synchronous and pure. Inputs are borrowed and left
//! untouched, so one [`Materializer`] can be shared across threads.
//!
//! ## Example
//!
//! ```rust
//! use docstore_materialize::Materializer;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "Name": "Ayende",
//!     "@metadata": { "@id": "users/1", "Raven-Entity-Name": "Users" }
//! });
//! let doc = Materializer::default()
//!     .document_from_json(raw.as_object().unwrap())
//!     .unwrap();
//! assert_eq!(doc.key, "users/1");
//! assert!(!doc.data.contains_key("@metadata"));
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Materialized record types |
//! | [`document`] | Documents and metadata from JSON or headers |
//! | [`query`] | Query results |
//! | [`attachment`] | Attachment descriptors |
//! | [`extract`] | Typed field access with shape guards |
//! | [`headers`] | Reserved-name filtering of metadata |
//! | [`dates`] | Store and HTTP date formats |
//! | [`etag`] | Version tokens |

pub mod attachment;
pub mod config;
pub mod constants;
pub mod dates;
pub mod document;
pub mod error;
pub mod etag;
pub mod extract;
pub mod headers;
pub mod models;
pub mod query;

pub use attachment::attachments_from_json;
pub use config::{load_config, Config};
pub use document::Materializer;
pub use error::{MaterializeError, Result};
pub use etag::Etag;
pub use models::{Attachment, Document, DocumentMetadata, Highlightings, JsonObject, QueryResult};
pub use query::query_result_from_json;
