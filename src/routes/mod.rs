pub mod boys;
pub mod donations;
pub mod export;
pub mod health;
pub mod media;
pub mod metrics;
pub mod sponsorships;
pub mod stats;
pub mod volunteers;

use axum::{http::StatusCode, Json};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::{models::lenient::fold_legacy_keys, services::ServiceError, store::Document};

pub type ApiError = (StatusCode, Json<Value>);

pub fn error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": msg.into() })))
}

/// Map a service failure to its HTTP shape. Unexpected failures are logged and
/// reported without internals.
pub fn service_error(e: ServiceError) -> ApiError {
    match e {
        ServiceError::Invalid(msg) => error(StatusCode::BAD_REQUEST, msg),
        ServiceError::NotFound(_) => error(StatusCode::NOT_FOUND, e.to_string()),
        ServiceError::Unavailable(_) => error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        ServiceError::Store(e) => {
            tracing::error!("Store error: {e}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
        ServiceError::Other(e) => {
            tracing::error!("Request failed: {e:#}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Fold legacy keys, check required fields on the raw body, then map it onto
/// the request type.
///
/// A field counts as missing when absent, null, or a blank string.
pub fn parse_body<T: DeserializeOwned>(
    mut body: Value,
    legacy: &[(&str, &str)],
    required: &[&str],
) -> Result<T, ApiError> {
    let Value::Object(fields) = &mut body else {
        return Err(error(StatusCode::BAD_REQUEST, "Request body must be a JSON object"));
    };
    fold_legacy_keys(fields, legacy);
    for field in required {
        let missing = match fields.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(error(
                StatusCode::BAD_REQUEST,
                format!("Missing required field: {field}"),
            ));
        }
    }
    serde_json::from_value(body)
        .map_err(|e| error(StatusCode::BAD_REQUEST, format!("Invalid request body: {e}")))
}

/// Partial-update bodies are plain JSON objects.
pub fn patch_body(body: Value) -> Result<Document, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(error(StatusCode::BAD_REQUEST, "Request body must be a JSON object")),
    }
}

/// Build an equality filter from the query parameters that were supplied.
pub fn filter_of<const N: usize>(pairs: [(&str, Option<Value>); N]) -> Document {
    pairs
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field.to_string(), v)))
        .collect()
}

pub fn to_json<T: Serialize>(value: &T) -> Result<Json<Value>, ApiError> {
    serde_json::to_value(value).map(Json).map_err(|e| {
        tracing::error!("Serialization failed: {e}");
        error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })
}
