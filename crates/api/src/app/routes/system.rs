use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::app::errors::{self, METHOD_NOT_ALLOWED_MESSAGE, NOT_FOUND_MESSAGE};

pub async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Users Access Control",
        "endpoints": {
            "/login": "Obtain an access token",
            "/users": "Manage users",
            "/roles": "Inspect roles and their facility access rights",
            "/facility-types": "List facility types",
            "/facilities": "Manage facilities and their functional areas",
            "/functional-areas": "Manage the functional area hierarchy",
        },
    }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}

/// Give the router's bare 405 the same JSON error body as everything else.
pub async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let mut mapped = errors::json_error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE);
    if let Some(allow) = response.headers().get(header::ALLOW) {
        mapped.headers_mut().insert(header::ALLOW, allow.clone());
    }
    mapped
}
