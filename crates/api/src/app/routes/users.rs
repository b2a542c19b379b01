use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use accessctl_core::UserId;

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{json_body, list, message, parse_id};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<axum::response::Response> {
    let users = services.store.list_users().await?;
    Ok(list(users.into_iter().map(dto::user_summary_to_json).collect()))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<axum::response::Response> {
    let id: UserId = parse_id(&id)?;
    let user = services
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(dto::user_to_json(user)).into_response())
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> ApiResult<axum::response::Response> {
    let valid = json_body(body)?.validate()?;
    let password_hash = services.hash_password(valid.password.clone()).await?;
    let user = valid.into_new_user(password_hash);
    let login = user.login.clone();

    let id = services.store.create_user(user).await?;
    tracing::info!(user_id = %id, %login, by = principal.subject(), role = %principal.role(), "user created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "User created successfully",
            "user_id": id.get(),
        })),
    )
        .into_response())
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> ApiResult<axum::response::Response> {
    let id: UserId = parse_id(&id)?;
    let (mut patch, password) = json_body(body)?.into_patch()?;
    if let Some(password) = password {
        patch.password_hash = Some(services.hash_password(password).await?);
    }

    services.store.update_user(id, patch).await?;
    tracing::info!(user_id = %id, by = principal.subject(), role = %principal.role(), "user updated");
    Ok(message(StatusCode::OK, "User updated successfully"))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult<axum::response::Response> {
    let id: UserId = parse_id(&id)?;
    services.store.delete_user(id).await?;
    tracing::info!(user_id = %id, by = principal.subject(), role = %principal.role(), "user deleted");
    Ok(message(StatusCode::OK, "User deleted successfully"))
}
