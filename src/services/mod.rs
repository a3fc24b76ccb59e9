pub mod boys;
pub mod donations;
pub mod email;
pub mod export;
pub mod media;
pub mod metrics;
pub mod records;
pub mod sponsorships;
pub mod stats;
pub mod storage;
pub mod volunteers;

use crate::store::StoreError;

/// Failures a handler needs to tell apart.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} is not configured")]
    Unavailable(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub(crate) fn invalid(msg: impl Into<String>) -> ServiceError {
    ServiceError::Invalid(msg.into())
}

/// Trimmed, non-empty text or a validation error naming the field.
pub(crate) fn non_blank(value: &str, field: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(invalid(format!("Missing required field: {field}")))
    } else {
        Ok(trimmed.to_string())
    }
}

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
