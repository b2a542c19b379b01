use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use accessctl_core::{FacilityId, RoleId};

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{json_body, list, message, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_roles))
        .route("/:id", get(get_role))
        .route("/:id/access-rights", get(list_access_rights))
        .route("/:id/access-rights/:facility_id", put(grant_access).delete(revoke_access))
}

pub async fn list_roles(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<axum::response::Response> {
    let roles = services.store.list_roles().await?;
    Ok(list(roles.into_iter().map(dto::role_to_json).collect()))
}

pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<axum::response::Response> {
    let id: RoleId = parse_id(&id)?;
    let role = services
        .store
        .get_role(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;
    Ok(Json(dto::role_to_json(role)).into_response())
}

pub async fn list_access_rights(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<axum::response::Response> {
    let id: RoleId = parse_id(&id)?;
    let rights = services.store.list_access_rights(id).await?;
    Ok(list(rights.into_iter().map(dto::access_right_to_json).collect()))
}

pub async fn grant_access(
    Extension(services): Extension<Arc<AppServices>>,
    Path((role_id, facility_id)): Path<(String, String)>,
    body: Result<Json<dto::GrantAccessRequest>, JsonRejection>,
) -> ApiResult<axum::response::Response> {
    let role_id: RoleId = parse_id(&role_id)?;
    let facility_id: FacilityId = parse_id(&facility_id)?;
    let level = json_body(body)?.validate()?;

    services.store.grant_access(role_id, facility_id, level).await?;
    Ok(message(StatusCode::OK, "Access right saved"))
}

pub async fn revoke_access(
    Extension(services): Extension<Arc<AppServices>>,
    Path((role_id, facility_id)): Path<(String, String)>,
) -> ApiResult<axum::response::Response> {
    let role_id: RoleId = parse_id(&role_id)?;
    let facility_id: FacilityId = parse_id(&facility_id)?;

    services.store.revoke_access(role_id, facility_id).await?;
    Ok(message(StatusCode::OK, "Access right revoked"))
}
