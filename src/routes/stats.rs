use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    middleware::admin::AdminAuth,
    routes::{error, to_json, ApiError},
    services::stats::StatsService,
    AppState,
};

pub const MAX_TOP_N: usize = 50;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub top: Option<usize>,
}

/// GET /api/admin/stats: dashboard summary computed over every collection.
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let top_n = query
        .top
        .unwrap_or(state.config.stats_top_n)
        .clamp(1, MAX_TOP_N);

    let stats = StatsService::dashboard(state.store.as_ref(), top_n)
        .await
        .map_err(|e| {
            tracing::error!("Failed to compute dashboard stats: {e:#}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load dashboard stats")
        })?;
    to_json(&stats)
}
