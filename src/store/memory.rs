use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    matches_filter, stamp_new, stamp_update, validate_collection, Document, RecordId,
    RecordStore, StoreResult,
};

/// Process-local store. Used by the test suite and by `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryRecordStore {
    collections: RwLock<BTreeMap<String, Vec<Document>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn position(docs: &[Document], id: &RecordId) -> Option<usize> {
    docs.iter()
        .position(|doc| doc.get("id").and_then(|v| v.as_str()) == Some(id.as_str()))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn add_record(&self, collection: &str, fields: Document) -> StoreResult<Document> {
        validate_collection(collection)?;
        let doc = stamp_new(fields, &RecordId::generate(), Utc::now());
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn get_records(
        &self,
        collection: &str,
        filter: Option<&Document>,
    ) -> StoreResult<Vec<Document>> {
        validate_collection(collection)?;
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches_filter(doc, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_record_by_id(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> StoreResult<Option<Document>> {
        validate_collection(collection)?;
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|docs| position(docs, id).map(|i| docs[i].clone())))
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &RecordId,
        updates: Document,
    ) -> StoreResult<Option<Document>> {
        validate_collection(collection)?;
        let updates = stamp_update(updates, Utc::now());
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(None);
        };
        let Some(i) = position(docs, id) else {
            return Ok(None);
        };
        let doc = &mut docs[i];
        for (k, v) in updates {
            doc.insert(k, v);
        }
        Ok(Some(doc.clone()))
    }

    async fn delete_record(&self, collection: &str, id: &RecordId) -> StoreResult<bool> {
        validate_collection(collection)?;
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(false);
        };
        match position(docs, id) {
            Some(i) => {
                docs.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
