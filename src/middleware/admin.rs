use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::AppState;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Extractor that validates the `X-Admin-Key` header against `config.admin_api_key`.
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing X-Admin-Key header"))?;

        if !keys_match(key, &state.config.admin_api_key) {
            tracing::warn!("Rejected admin request to {}", parts.uri.path());
            return Err(unauthorized("Invalid admin key"));
        }

        Ok(AdminAuth)
    }
}

/// Compares fixed-length digests without short-circuiting, so timing does not
/// depend on how much of the key matched.
fn keys_match(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    given
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn unauthorized(msg: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg })))
}
