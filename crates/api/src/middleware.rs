use std::sync::Arc;

use axum::{extract::State, middleware::Next, response::Response};

use worklog_auth::extract_bearer;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Resolve the bearer token to a [`worklog_auth::Principal`] and attach it to
/// the request. Any failure ends the request with a 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = extract_bearer(header)?;

    let principal = state.services.resolve(token)?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
