use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    middleware::admin::AdminAuth,
    models::boy::{AssessmentRequest, BoyStatus, CreateBoyRequest, ProgramTrack, SessionRequest},
    routes::{filter_of, parse_body, patch_body, service_error, ApiError},
    services::{
        boys::{with_full_name, BoyService},
        records::RecordService,
    },
    store::{collections, Document},
    AppState,
};

const REQUIRED: [&str; 7] = [
    "first_name",
    "last_name",
    "date_of_birth",
    "program_track",
    "guardian_name",
    "guardian_phone",
    "guardian_signature",
];

#[derive(Debug, Deserialize)]
pub struct BoyFilter {
    pub program_track: Option<ProgramTrack>,
    pub status: Option<BoyStatus>,
}

fn boy_json(doc: Document) -> Json<Value> {
    Json(Value::Object(with_full_name(doc)))
}

pub async fn list_boys(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<BoyFilter>,
) -> Result<Json<Value>, ApiError> {
    let filter = filter_of([
        ("program_track", query.program_track.map(|t| json!(t))),
        ("status", query.status.map(|s| json!(s))),
    ]);
    let boys = RecordService::list(state.store.as_ref(), collections::BOYS, filter)
        .await
        .map_err(service_error)?;
    Ok(Json(Value::Array(
        boys.into_iter()
            .map(|doc| Value::Object(with_full_name(doc)))
            .collect(),
    )))
}

pub async fn create_boy(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let req: CreateBoyRequest = parse_body(body, &[], &REQUIRED)?;
    BoyService::enroll(
        state.store.as_ref(),
        state.storage.as_deref(),
        req,
        Utc::now().date_naive(),
    )
    .await
    .map(boy_json)
    .map_err(service_error)
}

pub async fn get_boy(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    RecordService::get(state.store.as_ref(), collections::BOYS, &id)
        .await
        .map(boy_json)
        .map_err(service_error)
}

/// Serves both PATCH and PUT: fields present in the body are merged.
pub async fn update_boy(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let updates = patch_body(body)?;
    BoyService::update(state.store.as_ref(), &id, updates)
        .await
        .map(boy_json)
        .map_err(service_error)
}

pub async fn delete_boy(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    RecordService::delete(state.store.as_ref(), collections::BOYS, &id)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "success": true })))
}

pub async fn add_assessment(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let req: AssessmentRequest = parse_body(body, &[], &["kind"])?;
    BoyService::add_assessment(state.store.as_ref(), &id, req)
        .await
        .map(boy_json)
        .map_err(service_error)
}

pub async fn add_session(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let req: SessionRequest = parse_body(body, &[], &["title"])?;
    BoyService::add_session(state.store.as_ref(), &id, req)
        .await
        .map(boy_json)
        .map_err(service_error)
}
