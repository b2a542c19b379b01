use core::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use accessctl_core::DomainError;

use crate::app::errors::ApiResult;

/// Parse a path segment into a typed id (400 on failure).
pub fn parse_id<T>(raw: &str) -> ApiResult<T>
where
    T: FromStr<Err = DomainError>,
{
    Ok(raw.parse::<T>()?)
}

/// Unwrap a JSON body, turning extractor rejections into 400 errors.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    Ok(body?.0)
}

pub fn message(status: StatusCode, text: &str) -> axum::response::Response {
    (status, Json(serde_json::json!({ "message": text }))).into_response()
}

pub fn list(items: Vec<serde_json::Value>) -> axum::response::Response {
    (StatusCode::OK, Json(serde_json::Value::Array(items))).into_response()
}
