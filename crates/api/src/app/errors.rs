//! HTTP error taxonomy; every failure renders as `{"error": <message>}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use accessctl_auth::AuthError;
use accessctl_core::DomainError;
use accessctl_infra::StoreError;

pub const INTEGRITY_MESSAGE: &str =
    "Integrity error: a referenced record does not exist or a unique value is already taken";
pub const INTERNAL_MESSAGE: &str = "Internal server error";
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(AuthError),

    /// Constraint failure; the detail is logged, not returned.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Unexpected fault; the detail is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Integrity(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::Auth(AuthError::Internal(_)) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        match self {
            ApiError::Integrity(detail) => {
                tracing::info!(%detail, "write rejected by store constraint");
                json_error(status, INTEGRITY_MESSAGE)
            }
            ApiError::Internal(detail) | ApiError::Auth(AuthError::Internal(detail)) => {
                tracing::error!(%detail, "request failed");
                json_error(status, INTERNAL_MESSAGE)
            }
            other => json_error(status, other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg.to_string()),
            StoreError::Integrity(msg) => ApiError::Integrity(msg),
            StoreError::Invariant(msg) => ApiError::Validation(msg),
            StoreError::Database(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ApiError::Validation(msg),
            DomainError::InvariantViolation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}
