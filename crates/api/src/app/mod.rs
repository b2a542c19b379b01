//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store connection, seeding, token issuing, password hashing
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request validation and JSON mapping helpers
//! - `errors.rs`: error taxonomy and consistent error bodies

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use accessctl_auth::Role;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services))
}

/// Router over already-built services.
pub fn router(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.jwt.clone(),
        required_role: Role::admin(),
    };

    // Admin-only routes; `route_layer` keeps unknown paths on the 404 fallback.
    let protected = routes::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::require_role,
    ));

    Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .route("/login", post(routes::auth::login))
        .merge(protected)
        .fallback(routes::system::not_found)
        .layer(axum::middleware::map_response(routes::system::method_not_allowed))
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(panic_response)),
        )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(%detail, "handler panicked");
    errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, errors::INTERNAL_MESSAGE)
}
