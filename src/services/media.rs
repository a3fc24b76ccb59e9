use serde_json::{json, Value};

use crate::{
    models::{
        lenient::fold_legacy_keys,
        media::{self, CreateMediaRequest, Media, MediaCategory, MediaQuery, MediaType, UploaderRole},
    },
    services::{
        blank_to_none, invalid,
        records::{check_field, RecordService},
        storage::{infer_media_type, is_data_uri, CloudStorage},
        ServiceError, ServiceResult,
    },
    store::{collections, Document, RecordId, RecordStore},
};

/// Fields that tie a media item to its place in cloud storage.
const FIXED_FIELDS: [&str; 2] = ["url", "hosted"];

pub struct MediaService;

impl MediaService {
    /// Upload a data URI or register an external link. Exactly one of `file`
    /// and `url` must be given.
    pub async fn create(
        store: &dyn RecordStore,
        storage: Option<&CloudStorage>,
        req: CreateMediaRequest,
    ) -> ServiceResult<Document> {
        let (url, media_type, hosted) = match (req.file, req.url) {
            (Some(file), None) => {
                if !is_data_uri(&file) {
                    return Err(invalid("file must be a base64 data URI"));
                }
                let storage = storage.ok_or(ServiceError::Unavailable("File storage"))?;
                let media_type = req.media_type.unwrap_or_else(|| infer_media_type(&file));
                let category = req.category.unwrap_or_default().to_string();
                let outcome = storage
                    .upload(&file, "media", &["media", category.as_str()], media_type)
                    .await?;
                (outcome.secure_url, media_type, true)
            }
            (None, Some(url)) => {
                if is_data_uri(&url) {
                    return Err(invalid("Send uploads in file, not url"));
                }
                let media_type = req.media_type.unwrap_or_else(|| infer_media_type(&url));
                (url, media_type, false)
            }
            (Some(_), Some(_)) => return Err(invalid("Provide either file or url, not both")),
            (None, None) => return Err(invalid("Missing required field: file or url")),
        };

        let media = Media {
            url,
            media_type,
            category: req.category.unwrap_or_default(),
            uploaded_by: req.uploaded_by.unwrap_or_default(),
            boy_id: req.boy_id.as_deref().and_then(RecordId::parse).map(|id| id.to_string()),
            volunteer_id: req
                .volunteer_id
                .as_deref()
                .and_then(RecordId::parse)
                .map(|id| id.to_string()),
            title: blank_to_none(req.title),
            description: blank_to_none(req.description),
            hosted,
        };

        let doc = RecordService::create(store, collections::MEDIA, &media).await?;

        // The media record is saved; a failed link leaves the boy untouched.
        if let Some(boy_id) = media.boy_id.as_deref() {
            if let Err(e) = Self::attach_to_boy(store, boy_id, &doc, &media).await {
                tracing::warn!("Failed to link media to boy {boy_id}: {e}");
            }
        }

        Ok(doc)
    }

    pub async fn list(store: &dyn RecordStore, query: MediaQuery) -> ServiceResult<Vec<Document>> {
        let mut filter = Document::new();
        if let Some(id) = query.boy_id.as_deref().and_then(RecordId::parse) {
            filter.insert("boy_id".into(), Value::String(id.to_string()));
        }
        if let Some(id) = query.volunteer_id.as_deref().and_then(RecordId::parse) {
            filter.insert("volunteer_id".into(), Value::String(id.to_string()));
        }
        if let Some(category) = query.category {
            filter.insert("category".into(), Value::String(category.to_string()));
        }
        if let Some(media_type) = query.media_type {
            filter.insert("media_type".into(), Value::String(media_type.to_string()));
        }
        RecordService::list(store, collections::MEDIA, filter).await
    }

    /// Metadata edits only. The stored asset itself is fixed.
    pub async fn update(store: &dyn RecordStore, raw_id: &str, mut updates: Document) -> ServiceResult<Document> {
        fold_legacy_keys(&mut updates, media::LEGACY_KEYS);
        for field in FIXED_FIELDS {
            updates.remove(field);
        }
        check_field::<MediaType>(&updates, "media_type")?;
        check_field::<MediaCategory>(&updates, "category")?;
        check_field::<UploaderRole>(&updates, "uploaded_by")?;
        RecordService::update(store, collections::MEDIA, raw_id, updates).await
    }

    /// Delete the record and drop its reference from the linked boy.
    pub async fn delete(store: &dyn RecordStore, raw_id: &str) -> ServiceResult<()> {
        let doc = RecordService::get(store, collections::MEDIA, raw_id).await?;
        RecordService::delete(store, collections::MEDIA, raw_id).await?;

        let media_id = doc.get("id").and_then(Value::as_str).unwrap_or_default();
        if let Some(boy_id) = doc.get("boy_id").and_then(Value::as_str).and_then(RecordId::parse) {
            if let Some(boy) = store.get_record_by_id(collections::BOYS, &boy_id).await? {
                let remaining: Vec<Value> = match boy.get("media") {
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter(|item| item.get("id").and_then(Value::as_str) != Some(media_id))
                        .cloned()
                        .collect(),
                    _ => Vec::new(),
                };
                let mut updates = Document::new();
                updates.insert("media".into(), Value::Array(remaining));
                store.update_record(collections::BOYS, &boy_id, updates).await?;
            }
        }
        Ok(())
    }

    /// Soft association: a missing boy is logged, not an error.
    async fn attach_to_boy(
        store: &dyn RecordStore,
        boy_id: &str,
        doc: &Document,
        media: &Media,
    ) -> ServiceResult<()> {
        let Some(id) = RecordId::parse(boy_id) else {
            return Ok(());
        };
        let Some(boy) = store.get_record_by_id(collections::BOYS, &id).await? else {
            tracing::warn!("Media linked to unknown boy {boy_id}");
            return Ok(());
        };

        let mut items = match boy.get("media") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        items.push(json!({
            "id": doc.get("id").cloned().unwrap_or(Value::Null),
            "url": media.url,
            "media_type": media.media_type,
            "category": media.category,
            "title": media.title,
        }));

        let mut updates = Document::new();
        updates.insert("media".into(), Value::Array(items));
        if media.category == MediaCategory::Profile && media.media_type == MediaType::Image {
            updates.insert("profile_photo".into(), Value::String(media.url.clone()));
        }
        store.update_record(collections::BOYS, &id, updates).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryRecordStore, StoreError, StoreResult};

    async fn boy(store: &MemoryRecordStore) -> String {
        let doc = RecordService::create(
            store,
            collections::BOYS,
            &json!({ "first_name": "Ade", "last_name": "Lagos", "media": [] }),
        )
        .await
        .unwrap();
        doc["id"].as_str().unwrap().to_string()
    }

    fn link(body: Value) -> CreateMediaRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn profile_photo_link_updates_the_boy() {
        let store = MemoryRecordStore::new();
        let boy_id = boy(&store).await;
        let doc = MediaService::create(
            &store,
            None,
            link(json!({
                "url": "https://cdn.example.org/ade.jpg",
                "category": "profile",
                "boy_id": boy_id.to_uppercase()
            })),
        )
        .await
        .unwrap();
        assert_eq!(doc["media_type"], "image");
        assert_eq!(doc["hosted"], false);
        assert_eq!(doc["boy_id"], boy_id.as_str());

        let boy = RecordService::get(&store, collections::BOYS, &boy_id).await.unwrap();
        assert_eq!(boy["profile_photo"], "https://cdn.example.org/ade.jpg");
        assert_eq!(boy["media"][0]["id"], doc["id"]);

        MediaService::delete(&store, doc["id"].as_str().unwrap()).await.unwrap();
        let boy = RecordService::get(&store, collections::BOYS, &boy_id).await.unwrap();
        assert_eq!(boy["media"], json!([]));
    }

    /// Memory store whose boy updates always fail.
    struct BoyUpdatesFail(MemoryRecordStore);

    #[async_trait::async_trait]
    impl RecordStore for BoyUpdatesFail {
        async fn add_record(&self, collection: &str, fields: Document) -> StoreResult<Document> {
            self.0.add_record(collection, fields).await
        }

        async fn get_records(
            &self,
            collection: &str,
            filter: Option<&Document>,
        ) -> StoreResult<Vec<Document>> {
            self.0.get_records(collection, filter).await
        }

        async fn get_record_by_id(
            &self,
            collection: &str,
            id: &RecordId,
        ) -> StoreResult<Option<Document>> {
            self.0.get_record_by_id(collection, id).await
        }

        async fn update_record(
            &self,
            collection: &str,
            id: &RecordId,
            updates: Document,
        ) -> StoreResult<Option<Document>> {
            if collection == collections::BOYS {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            self.0.update_record(collection, id, updates).await
        }

        async fn delete_record(&self, collection: &str, id: &RecordId) -> StoreResult<bool> {
            self.0.delete_record(collection, id).await
        }

        async fn ping(&self) -> StoreResult<()> {
            self.0.ping().await
        }
    }

    #[tokio::test]
    async fn failed_boy_link_still_returns_the_saved_media() {
        let inner = MemoryRecordStore::new();
        let boy_id = boy(&inner).await;
        let store = BoyUpdatesFail(inner);
        let doc = MediaService::create(
            &store,
            None,
            link(json!({ "url": "https://cdn.example.org/ade.jpg", "category": "profile", "boy_id": boy_id })),
        )
        .await
        .unwrap();

        let saved = RecordService::get(&store, collections::MEDIA, doc["id"].as_str().unwrap())
            .await
            .unwrap();
        assert_eq!(saved["url"], "https://cdn.example.org/ade.jpg");
        let boy = RecordService::get(&store, collections::BOYS, &boy_id).await.unwrap();
        assert_eq!(boy["media"], json!([]));
        assert!(boy.get("profile_photo").is_none());
    }

    #[tokio::test]
    async fn file_upload_without_storage_is_unavailable() {
        let store = MemoryRecordStore::new();
        let err = MediaService::create(&store, None, link(json!({ "file": "data:image/png;base64,iVBOR" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn file_or_url_is_required() {
        let store = MemoryRecordStore::new();
        let err = MediaService::create(&store, None, link(json!({ "title": "Nothing" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[tokio::test]
    async fn list_filters_by_category_and_boy() {
        let store = MemoryRecordStore::new();
        let boy_id = boy(&store).await;
        for (url, category) in [
            ("https://youtu.be/abc", "session"),
            ("https://cdn.example.org/report.pdf", "assessment"),
        ] {
            MediaService::create(
                &store,
                None,
                link(json!({ "url": url, "category": category, "boy_id": boy_id })),
            )
            .await
            .unwrap();
        }
        let query: MediaQuery =
            serde_json::from_value(json!({ "boy_id": boy_id, "category": "session" })).unwrap();
        let sessions = MediaService::list(&store, query).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["media_type"], "video");
    }

    #[tokio::test]
    async fn url_cannot_be_edited() {
        let store = MemoryRecordStore::new();
        let doc = MediaService::create(&store, None, link(json!({ "url": "https://youtu.be/abc" })))
            .await
            .unwrap();
        let patch = json!({ "url": "https://evil.example", "title": "Drills" });
        let updated = MediaService::update(&store, doc["id"].as_str().unwrap(), patch.as_object().cloned().unwrap())
            .await
            .unwrap();
        assert_eq!(updated["url"], "https://youtu.be/abc");
        assert_eq!(updated["title"], "Drills");
    }
}
