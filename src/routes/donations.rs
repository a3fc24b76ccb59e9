use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    middleware::admin::AdminAuth,
    models::donation::{self, CreateDonationRequest, DonationStatus},
    routes::{filter_of, parse_body, service_error, ApiError},
    services::{donations::DonationService, records::RecordService},
    store::collections,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct DonationFilter {
    pub program: Option<String>,
    pub status: Option<DonationStatus>,
}

pub async fn list_donations(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<DonationFilter>,
) -> Result<Json<Value>, ApiError> {
    let program = query
        .program
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty());
    let filter = filter_of([
        ("program", program.map(Value::String)),
        ("status", query.status.map(|s| json!(s))),
    ]);
    RecordService::list(state.store.as_ref(), collections::DONATIONS, filter)
        .await
        .map(|docs| Json(Value::Array(docs.into_iter().map(Value::Object).collect())))
        .map_err(service_error)
}

/// Public donation form. Records the intent only; payment happens elsewhere.
pub async fn create_donation(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let req: CreateDonationRequest = parse_body(body, donation::LEGACY_KEYS, &["program", "amount"])?;
    DonationService::record(
        state.store.as_ref(),
        state.email.as_deref(),
        &state.config.default_currency,
        req,
    )
    .await
    .map(|doc| Json(Value::Object(doc)))
    .map_err(service_error)
}

pub async fn get_donation(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    RecordService::get(state.store.as_ref(), collections::DONATIONS, &id)
        .await
        .map(|doc| Json(Value::Object(doc)))
        .map_err(service_error)
}

pub async fn delete_donation(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    RecordService::delete(state.store.as_ref(), collections::DONATIONS, &id)
        .await
        .map_err(service_error)?;
    Ok(Json(json!({ "success": true })))
}
