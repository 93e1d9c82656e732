use axum::{
    Router,
    routing::{get, post},
};

pub mod admin;
pub mod auth;
pub mod logs;
pub mod system;

/// Routes reachable without a bearer token.
pub fn public() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Router for all authenticated endpoints.
pub fn protected() -> Router {
    Router::new()
        .route("/me", get(system::me))
        .nest("/logs", logs::router())
        .nest("/admin", admin::router())
}
