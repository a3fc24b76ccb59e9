use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    middleware::admin::AdminAuth,
    models::media::{self, CreateMediaRequest, MediaQuery},
    routes::{parse_body, patch_body, service_error, ApiError},
    services::{media::MediaService, records::RecordService},
    store::collections,
    AppState,
};

pub async fn list_media(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<MediaQuery>,
) -> Result<Json<Value>, ApiError> {
    MediaService::list(state.store.as_ref(), query)
        .await
        .map(|docs| Json(Value::Array(docs.into_iter().map(Value::Object).collect())))
        .map_err(service_error)
}

/// Accepts either a base64 `file` (uploaded to cloud storage) or an external `url`.
pub async fn create_media(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let req: CreateMediaRequest = parse_body(body, media::LEGACY_KEYS, &[])?;
    MediaService::create(state.store.as_ref(), state.storage.as_deref(), req)
        .await
        .map(|doc| Json(Value::Object(doc)))
        .map_err(service_error)
}

pub async fn get_media(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    RecordService::get(state.store.as_ref(), collections::MEDIA, &id)
        .await
        .map(|doc| Json(Value::Object(doc)))
        .map_err(service_error)
}

pub async fn update_media(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let updates = patch_body(body)?;
    MediaService::update(state.store.as_ref(), &id, updates)
        .await
        .map(|doc| Json(Value::Object(doc)))
        .map_err(service_error)
}

pub async fn delete_media(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    MediaService::delete(state.store.as_ref(), &id)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "success": true })))
}
