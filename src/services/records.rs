use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    services::{invalid, metrics, ServiceError, ServiceResult},
    store::{collections, Document, RecordId, RecordStore},
};

/// Collection-agnostic operations shared by every entity route.
pub struct RecordService;

fn label(collection: &str) -> &'static str {
    match collection {
        collections::BOYS => "Boy",
        collections::VOLUNTEERS => "Volunteer",
        collections::DONATIONS => "Donation",
        collections::SPONSORSHIPS => "Sponsorship",
        collections::MEDIA => "Media",
        collections::USERS => "User",
        _ => "Record",
    }
}

/// Boundary normalization of caller identifiers. Blank ids cannot match anything.
pub fn parse_id(collection: &str, raw: &str) -> ServiceResult<RecordId> {
    RecordId::parse(raw).ok_or(ServiceError::NotFound(label(collection)))
}

/// Serialize a canonical entity into a document.
pub fn to_document<T: Serialize>(entity: &T) -> ServiceResult<Document> {
    match serde_json::to_value(entity).map_err(anyhow::Error::from)? {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow::anyhow!("entity did not serialize to an object").into()),
    }
}

/// Reject a patch whose `field` is present but not a valid `T`.
pub fn check_field<T: DeserializeOwned>(updates: &Document, field: &str) -> ServiceResult<()> {
    match updates.get(field) {
        Some(value) if serde_json::from_value::<T>(value.clone()).is_err() => {
            Err(invalid(format!("Invalid value for {field}: {value}")))
        }
        _ => Ok(()),
    }
}

impl RecordService {
    pub async fn create<T: Serialize>(
        store: &dyn RecordStore,
        collection: &str,
        entity: &T,
    ) -> ServiceResult<Document> {
        let doc = store.add_record(collection, to_document(entity)?).await?;
        metrics::record_created(collection);
        tracing::info!(
            "Created {} {}",
            label(collection).to_lowercase(),
            doc.get("id").and_then(|v| v.as_str()).unwrap_or("?")
        );
        Ok(doc)
    }

    pub async fn list(
        store: &dyn RecordStore,
        collection: &str,
        filter: Document,
    ) -> ServiceResult<Vec<Document>> {
        let filter = (!filter.is_empty()).then_some(filter);
        Ok(store.get_records(collection, filter.as_ref()).await?)
    }

    pub async fn get(store: &dyn RecordStore, collection: &str, raw_id: &str) -> ServiceResult<Document> {
        let id = parse_id(collection, raw_id)?;
        store
            .get_record_by_id(collection, &id)
            .await?
            .ok_or(ServiceError::NotFound(label(collection)))
    }

    pub async fn update(
        store: &dyn RecordStore,
        collection: &str,
        raw_id: &str,
        updates: Document,
    ) -> ServiceResult<Document> {
        let id = parse_id(collection, raw_id)?;
        store
            .update_record(collection, &id, updates)
            .await?
            .ok_or(ServiceError::NotFound(label(collection)))
    }

    pub async fn delete(store: &dyn RecordStore, collection: &str, raw_id: &str) -> ServiceResult<()> {
        let id = parse_id(collection, raw_id)?;
        if store.delete_record(collection, &id).await? {
            tracing::info!("Deleted {} {id}", label(collection).to_lowercase());
            Ok(())
        } else {
            Err(ServiceError::NotFound(label(collection)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;
    use serde_json::json;

    #[tokio::test]
    async fn missing_and_blank_ids_are_not_found() {
        let store = MemoryRecordStore::new();
        for raw in ["", "  ", "does-not-exist", "67e55044-10b1-426f-9247-bb680e5fe0c8"] {
            let err = RecordService::get(&store, collections::BOYS, raw).await.unwrap_err();
            assert!(matches!(err, ServiceError::NotFound("Boy")), "{raw}");
            let err = RecordService::delete(&store, collections::BOYS, raw).await.unwrap_err();
            assert!(matches!(err, ServiceError::NotFound("Boy")), "{raw}");
        }
    }

    #[tokio::test]
    async fn empty_filter_lists_everything() {
        let store = MemoryRecordStore::new();
        RecordService::create(&store, collections::MEDIA, &json!({ "category": "session" }))
            .await
            .unwrap();
        RecordService::create(&store, collections::MEDIA, &json!({ "category": "profile" }))
            .await
            .unwrap();
        let all = RecordService::list(&store, collections::MEDIA, Document::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn field_checks_only_apply_when_present() {
        use crate::models::volunteer::VolunteerStatus;
        let ok = json!({ "status": "approved" });
        let bad = json!({ "status": "maybe" });
        let absent = json!({ "bio": "x" });
        assert!(check_field::<VolunteerStatus>(ok.as_object().unwrap(), "status").is_ok());
        assert!(check_field::<VolunteerStatus>(bad.as_object().unwrap(), "status").is_err());
        assert!(check_field::<VolunteerStatus>(absent.as_object().unwrap(), "status").is_ok());
    }
}
