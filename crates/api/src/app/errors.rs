use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;

use worklog_auth::AuthError;
use worklog_core::DomainError;
use worklog_infra::StoreError;

use crate::app::services::ServiceError;

/// Every failure a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Bearer credential missing or rejected. The cause is logged, never returned.
    Unauthenticated(AuthError),
    BadRequest(&'static str, String),
    Service(ServiceError),
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        ApiError::Unauthenticated(value)
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        ApiError::Service(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Unauthenticated(reason) => {
                tracing::debug!(reason = ?reason, "request unauthenticated");
                let mut res = json_error(
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "Could not validate credentials",
                );
                res.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    header::HeaderValue::from_static("Bearer"),
                );
                res
            }
            ApiError::BadRequest(code, msg) => json_error(StatusCode::BAD_REQUEST, code, msg),
            ApiError::Service(err) => service_error_to_response(err),
        }
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Incorrect email or password",
        ),
        ServiceError::Permission(e) => {
            tracing::debug!(reason = ?e, "request forbidden");
            json_error(StatusCode::FORBIDDEN, "forbidden", "not authorized")
        }
        ServiceError::Store(e) => store_error_to_response(e),
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Password(e) => internal(e),
        ServiceError::Token(e) => internal(e),
    }
}

fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        StoreError::Unavailable => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            "store unavailable",
        ),
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

fn internal(err: impl std::fmt::Display) -> axum::response::Response {
    tracing::error!(error = %err, "internal error");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal error",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
