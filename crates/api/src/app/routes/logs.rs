use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
};

use worklog_auth::{LogUpdate, Principal};
use worklog_core::{LogId, NewWorkLog};

use crate::app::{dto, errors::ApiError, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_own_logs).post(create_log))
        .route("/review", get(review_queue))
        .route("/:id", get(get_log).patch(update_log))
}

/// POST /logs - create a pending log owned by the caller.
pub async fn create_log(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<NewWorkLog>,
) -> Result<(StatusCode, Json<dto::LogResponse>), ApiError> {
    let log = services.create_log(&principal, body)?;
    Ok((StatusCode::CREATED, Json(log.into())))
}

pub async fn list_own_logs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Json<Vec<dto::LogResponse>> {
    Json(dto::logs_to_json(services.own_logs(&principal)))
}

/// GET /logs/review?status= - every log, for supervisors and admins.
pub async fn review_queue(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<dto::ReviewQuery>,
) -> Result<Json<Vec<dto::LogResponse>>, ApiError> {
    let status = dto::parse_status(query.status.as_deref())?;
    let logs = services.review_queue(&principal, status)?;
    Ok(Json(dto::logs_to_json(logs)))
}

pub async fn get_log(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<dto::LogResponse>, ApiError> {
    let id: LogId = dto::parse_id(&id)?;
    let log = services.get_log(&principal, id)?;
    Ok(Json(log.into()))
}

/// PATCH /logs/:id - owners edit content, reviewers set status.
pub async fn update_log(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<LogUpdate>,
) -> Result<Json<dto::LogResponse>, ApiError> {
    let id: LogId = dto::parse_id(&id)?;
    let log = services.update_log(&principal, id, &body)?;
    Ok(Json(log.into()))
}
