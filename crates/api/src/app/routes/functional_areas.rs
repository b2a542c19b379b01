use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use accessctl_core::FunctionalAreaId;

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{json_body, list, message, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_areas).post(create_area))
        .route("/:id", get(get_area).put(update_area).delete(delete_area))
}

pub async fn list_areas(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<axum::response::Response> {
    let areas = services.store.list_functional_areas().await?;
    Ok(list(areas.into_iter().map(dto::functional_area_to_json).collect()))
}

pub async fn get_area(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<axum::response::Response> {
    let id: FunctionalAreaId = parse_id(&id)?;
    let area = services
        .store
        .get_functional_area(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Functional area not found".to_string()))?;
    Ok(Json(dto::functional_area_to_json(area)).into_response())
}

pub async fn create_area(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateFunctionalAreaRequest>, JsonRejection>,
) -> ApiResult<axum::response::Response> {
    let area = json_body(body)?.validate()?;
    let id = services.store.create_functional_area(area).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Functional area created successfully",
            "functional_area_id": id.get(),
        })),
    )
        .into_response())
}

pub async fn update_area(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateFunctionalAreaRequest>, JsonRejection>,
) -> ApiResult<axum::response::Response> {
    let id: FunctionalAreaId = parse_id(&id)?;
    let patch = json_body(body)?.into_patch()?;
    services.store.update_functional_area(id, patch).await?;
    Ok(message(StatusCode::OK, "Functional area updated successfully"))
}

pub async fn delete_area(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<axum::response::Response> {
    let id: FunctionalAreaId = parse_id(&id)?;
    services.store.delete_functional_area(id).await?;
    Ok(message(StatusCode::OK, "Functional area deleted successfully"))
}
