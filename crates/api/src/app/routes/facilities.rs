use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use accessctl_core::{FacilityId, FunctionalAreaId};

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{json_body, list, message, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_facilities).post(create_facility))
        .route("/:id", get(get_facility).put(update_facility).delete(delete_facility))
        .route("/:id/functional-areas", get(list_functional_areas))
        .route("/:id/functional-areas/:area_id", put(link_functional_area).delete(unlink_functional_area))
}

pub async fn list_facility_types(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<axum::response::Response> {
    let types = services.store.list_facility_types().await?;
    Ok(list(types.into_iter().map(dto::facility_type_to_json).collect()))
}

pub async fn list_facilities(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<axum::response::Response> {
    let facilities = services.store.list_facilities().await?;
    Ok(list(facilities.into_iter().map(dto::facility_to_json).collect()))
}

pub async fn get_facility(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<axum::response::Response> {
    let id: FacilityId = parse_id(&id)?;
    let facility = services
        .store
        .get_facility(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Facility not found".to_string()))?;
    Ok(Json(dto::facility_to_json(facility)).into_response())
}

pub async fn create_facility(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateFacilityRequest>, JsonRejection>,
) -> ApiResult<axum::response::Response> {
    let facility = json_body(body)?.validate()?;
    let id = services.store.create_facility(facility).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Facility created successfully",
            "facility_id": id.get(),
        })),
    )
        .into_response())
}

pub async fn update_facility(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateFacilityRequest>, JsonRejection>,
) -> ApiResult<axum::response::Response> {
    let id: FacilityId = parse_id(&id)?;
    let patch = json_body(body)?.into_patch()?;
    services.store.update_facility(id, patch).await?;
    Ok(message(StatusCode::OK, "Facility updated successfully"))
}

pub async fn delete_facility(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<axum::response::Response> {
    let id: FacilityId = parse_id(&id)?;
    services.store.delete_facility(id).await?;
    Ok(message(StatusCode::OK, "Facility deleted successfully"))
}

pub async fn list_functional_areas(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<axum::response::Response> {
    let id: FacilityId = parse_id(&id)?;
    let areas = services.store.list_facility_functional_areas(id).await?;
    Ok(list(areas.into_iter().map(dto::functional_area_to_json).collect()))
}

pub async fn link_functional_area(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, area_id)): Path<(String, String)>,
) -> ApiResult<axum::response::Response> {
    let id: FacilityId = parse_id(&id)?;
    let area_id: FunctionalAreaId = parse_id(&area_id)?;
    services.store.link_functional_area(id, area_id).await?;
    Ok(message(StatusCode::OK, "Functional area linked to facility"))
}

pub async fn unlink_functional_area(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, area_id)): Path<(String, String)>,
) -> ApiResult<axum::response::Response> {
    let id: FacilityId = parse_id(&id)?;
    let area_id: FunctionalAreaId = parse_id(&area_id)?;
    services.store.unlink_functional_area(id, area_id).await?;
    Ok(message(StatusCode::OK, "Functional area unlinked from facility"))
}
