use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    middleware::admin::AdminAuth,
    models::volunteer::{CreateVolunteerRequest, VolunteerCategory, VolunteerStatus},
    routes::{filter_of, parse_body, patch_body, service_error, ApiError},
    services::{records::RecordService, volunteers::VolunteerService},
    store::collections,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct VolunteerFilter {
    pub status: Option<VolunteerStatus>,
    pub category: Option<VolunteerCategory>,
}

pub async fn list_volunteers(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<VolunteerFilter>,
) -> Result<Json<Value>, ApiError> {
    let filter = filter_of([
        ("status", query.status.map(|s| json!(s))),
        ("category", query.category.map(|c| json!(c))),
    ]);
    RecordService::list(state.store.as_ref(), collections::VOLUNTEERS, filter)
        .await
        .map(|docs| Json(Value::Array(docs.into_iter().map(Value::Object).collect())))
        .map_err(service_error)
}

/// Public application form.
pub async fn apply(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let req: CreateVolunteerRequest = parse_body(body, &[], &["name", "email"])?;
    VolunteerService::apply(
        state.store.as_ref(),
        state.storage.as_deref(),
        state.email.as_deref(),
        state.config.admin_notification_email.as_deref(),
        req,
    )
    .await
    .map(|doc| Json(Value::Object(doc)))
    .map_err(service_error)
}

pub async fn get_volunteer(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    RecordService::get(state.store.as_ref(), collections::VOLUNTEERS, &id)
        .await
        .map(|doc| Json(Value::Object(doc)))
        .map_err(service_error)
}

pub async fn update_volunteer(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let updates = patch_body(body)?;
    VolunteerService::update(
        state.store.as_ref(),
        state.email.as_deref(),
        &id,
        updates,
        Utc::now().date_naive(),
    )
    .await
    .map(|doc| Json(Value::Object(doc)))
    .map_err(service_error)
}

pub async fn delete_volunteer(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    RecordService::delete(state.store.as_ref(), collections::VOLUNTEERS, &id)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "success": true })))
}
