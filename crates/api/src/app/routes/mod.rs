use axum::{routing::get, Router};

pub mod auth;
pub mod common;
pub mod facilities;
pub mod functional_areas;
pub mod roles;
pub mod system;
pub mod users;

/// Router for every admin-only endpoint.
pub fn router() -> Router {
    Router::new()
        .nest("/users", users::router())
        .nest("/roles", roles::router())
        .route("/facility-types", get(facilities::list_facility_types))
        .nest("/facilities", facilities::router())
        .nest("/functional-areas", functional_areas::router())
}
