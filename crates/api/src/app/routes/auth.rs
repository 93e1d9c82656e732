use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use worklog_infra::StoreError;

use crate::app::services::{AppServices, ServiceError};
use crate::app::{dto, errors};

/// POST /register - self-service sign-up as an intern.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match services.register(body.into()) {
        Ok(record) => {
            tracing::info!(user_id = %record.id, "account registered");
            (StatusCode::CREATED, Json(dto::UserOut::from(record))).into_response()
        }
        // Self-registration reports duplicates as a client error, not a conflict.
        Err(ServiceError::Store(StoreError::Conflict(msg))) => {
            errors::json_error(StatusCode::BAD_REQUEST, "already_registered", msg)
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /login - exchange email and password for a bearer token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.login(&body.email, &body.password) {
        Ok(token) => Json(dto::TokenResponse::bearer(token)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
