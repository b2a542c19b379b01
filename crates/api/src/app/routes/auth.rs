use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::dto;
use crate::app::errors::ApiResult;
use crate::app::routes::common::json_body;
use crate::app::services::AppServices;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> ApiResult<axum::response::Response> {
    let (username, password) = json_body(body)?.validate()?;
    let token = services.login(&username, &password).await?;
    Ok((StatusCode::OK, Json(serde_json::json!({ "access_token": token }))).into_response())
}
