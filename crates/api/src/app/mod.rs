//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the operations behind each route, over the auth core and stores
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    http::{Method, header},
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router over in-memory stores (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> Result<Router, services::ServiceError> {
    let services = Arc::new(services::AppServices::from_config(config)?);
    Ok(router(services, cors(config)))
}

/// Router over already-wired services.
pub fn router(services: Arc<services::AppServices>, cors: CorsLayer) -> Router {
    let auth_state = middleware::AuthState {
        services: services.clone(),
    };

    // Protected routes: require a resolvable bearer token.
    let protected = routes::protected().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(cors).layer(Extension(services)))
}

fn cors(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
