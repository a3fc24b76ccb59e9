use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;

use super::{
    stamp_new, stamp_update, validate_collection, Document, RecordId, RecordStore, StoreError,
    StoreResult,
};

/// Documents stored as JSONB rows of the shared `records` table.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_document(value: Value) -> StoreResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(serde::de::Error::custom(format!(
            "expected a JSON object, found {other}"
        )))),
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn add_record(&self, collection: &str, fields: Document) -> StoreResult<Document> {
        validate_collection(collection)?;
        let id = RecordId::generate();
        let now = Utc::now();
        let doc = stamp_new(fields, &id, now);

        let stored: Value = sqlx::query_scalar(
            "INSERT INTO records (collection, id, doc, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING doc",
        )
        .bind(collection)
        .bind(id.as_str())
        .bind(Value::Object(doc))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        into_document(stored)
    }

    async fn get_records(
        &self,
        collection: &str,
        filter: Option<&Document>,
    ) -> StoreResult<Vec<Document>> {
        validate_collection(collection)?;
        // `@>` with an empty object matches every row.
        let filter = Value::Object(filter.cloned().unwrap_or_default());
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT doc FROM records
             WHERE collection = $1 AND doc @> $2
             ORDER BY seq",
        )
        .bind(collection)
        .bind(filter)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(into_document).collect()
    }

    async fn get_record_by_id(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> StoreResult<Option<Document>> {
        validate_collection(collection)?;
        let row: Option<Value> =
            sqlx::query_scalar("SELECT doc FROM records WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;
        row.map(into_document).transpose()
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &RecordId,
        updates: Document,
    ) -> StoreResult<Option<Document>> {
        validate_collection(collection)?;
        let now = Utc::now();
        let updates = stamp_update(updates, now);
        // `||` is a shallow merge: top-level keys of the payload replace stored ones.
        let row: Option<Value> = sqlx::query_scalar(
            "UPDATE records
             SET doc = doc || $3, updated_at = $4
             WHERE collection = $1 AND id = $2
             RETURNING doc",
        )
        .bind(collection)
        .bind(id.as_str())
        .bind(Value::Object(updates))
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_document).transpose()
    }

    async fn delete_record(&self, collection: &str, id: &RecordId) -> StoreResult<bool> {
        validate_collection(collection)?;
        let result = sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
