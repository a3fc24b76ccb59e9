use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    middleware::admin::AdminAuth,
    routes::{error, ApiError},
    services::export,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub year: Option<i32>,
}

pub async fn export_donations(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let csv = export::donations_csv(state.store.as_ref(), params.year)
        .await
        .map_err(|e| {
            tracing::error!("Donation export failed: {e:#}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to export donations")
        })?;

    let filename = match params.year {
        Some(year) => format!("attachment; filename=donations-{year}.csv"),
        None => "attachment; filename=donations.csv".to_string(),
    };
    let mut resp = csv.into_response();
    let headers = resp.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8"));
    if let Ok(value) = HeaderValue::from_str(&filename) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(resp)
}
