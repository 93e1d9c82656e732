use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use worklog_auth::Principal;

use crate::app::{dto, errors::ApiError, services::AppServices};

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "worklog backend is running" }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<dto::UserOut>, ApiError> {
    let record = services.account(&principal)?;
    Ok(Json(record.into()))
}
