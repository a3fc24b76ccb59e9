//! Generic document persistence.
//!
//! Every entity lives in a named collection of schemaless JSON documents. The
//! handlers build canonical documents and the [`RecordStore`] only knows about
//! identifiers and timestamps.

pub mod id;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

pub use id::RecordId;
pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, Value>;

pub mod collections {
    pub const BOYS: &str = "boys";
    pub const VOLUNTEERS: &str = "volunteers";
    pub const DONATIONS: &str = "donations";
    pub const SPONSORSHIPS: &str = "sponsorships";
    pub const MEDIA: &str = "media";
    pub const USERS: &str = "users";
}

/// Fields the store owns. Callers can never set or change them.
pub const IMMUTABLE_FIELDS: [&str; 3] = ["_id", "id", "created_at"];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid collection name: {0}")]
    InvalidCollection(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert `fields` under a fresh identifier, stamping `id` and `created_at`.
    async fn add_record(&self, collection: &str, fields: Document) -> StoreResult<Document>;

    /// All documents whose top-level fields equal every entry of `filter`,
    /// in insertion order.
    async fn get_records(
        &self,
        collection: &str,
        filter: Option<&Document>,
    ) -> StoreResult<Vec<Document>>;

    async fn get_record_by_id(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> StoreResult<Option<Document>>;

    /// Shallow merge of `updates` into the stored document. Immutable fields are
    /// dropped from the payload and `updated_at` is stamped. `None` when no
    /// document has this id.
    async fn update_record(
        &self,
        collection: &str,
        id: &RecordId,
        updates: Document,
    ) -> StoreResult<Option<Document>>;

    /// `true` when a document was removed.
    async fn delete_record(&self, collection: &str, id: &RecordId) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Collection names are interpolated nowhere, but are still restricted to
/// lowercase ASCII letters, digits and underscores, 1 to 63 characters.
pub fn validate_collection(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Prepare a new document: caller-supplied ids and timestamps are replaced.
pub(crate) fn stamp_new(mut fields: Document, id: &RecordId, now: DateTime<Utc>) -> Document {
    fields.remove("_id");
    fields.remove("updated_at");
    fields.insert("id".into(), Value::String(id.as_str().to_string()));
    fields.insert("created_at".into(), Value::String(timestamp(now)));
    fields
}

/// Prepare an update payload.
pub(crate) fn stamp_update(mut updates: Document, now: DateTime<Utc>) -> Document {
    for field in IMMUTABLE_FIELDS {
        updates.remove(field);
    }
    updates.insert("updated_at".into(), Value::String(timestamp(now)));
    updates
}

pub(crate) fn matches_filter(doc: &Document, filter: Option<&Document>) -> bool {
    match filter {
        None => true,
        Some(filter) => filter.iter().all(|(k, v)| doc.get(k) == Some(v)),
    }
}
