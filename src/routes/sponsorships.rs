use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    middleware::admin::AdminAuth,
    models::sponsorship::{self, CreateSponsorshipRequest},
    routes::{parse_body, service_error, ApiError},
    services::{records::RecordService, sponsorships::SponsorshipService},
    store::{collections, Document},
    AppState,
};

pub async fn list_sponsorships(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Value>, ApiError> {
    RecordService::list(state.store.as_ref(), collections::SPONSORSHIPS, Document::new())
        .await
        .map(|docs| Json(Value::Array(docs.into_iter().map(Value::Object).collect())))
        .map_err(service_error)
}

pub async fn create_sponsorship(
    State(state): State<AppState>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    sponsorship::fold_request_keys(&mut body);
    let req: CreateSponsorshipRequest = parse_body(body, &[], &["sponsor_name", "email", "amount"])?;
    SponsorshipService::record(
        state.store.as_ref(),
        state.email.as_deref(),
        &state.config.default_currency,
        req,
    )
    .await
    .map(|doc| Json(Value::Object(doc)))
    .map_err(service_error)
}

pub async fn get_sponsorship(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    RecordService::get(state.store.as_ref(), collections::SPONSORSHIPS, &id)
        .await
        .map(|doc| Json(Value::Object(doc)))
        .map_err(service_error)
}

pub async fn delete_sponsorship(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    RecordService::delete(state.store.as_ref(), collections::SPONSORSHIPS, &id)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "success": true })))
}
