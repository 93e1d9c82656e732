//! Account administration. Every handler here is admin-only; the role gate
//! is enforced by `AppServices`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, patch, post},
};

use worklog_auth::Principal;
use worklog_core::UserId;
use worklog_infra::AccountUpdate;

use crate::app::{dto, errors::ApiError, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/bulk", post(bulk_register))
        .route("/users/:id", patch(update_user).delete(delete_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<dto::UserOut>>, ApiError> {
    let users = services.list_accounts(&principal)?;
    Ok(Json(dto::users_to_json(users)))
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<AccountUpdate>,
) -> Result<Json<dto::UserOut>, ApiError> {
    let id: UserId = dto::parse_id(&id)?;
    let record = services.update_account(&principal, id, &body)?;
    Ok(Json(record.into()))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: UserId = dto::parse_id(&id)?;
    services.delete_account(&principal, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/users/bulk - returns only the accounts actually created.
pub async fn bulk_register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::BulkRegisterRequest>,
) -> Result<(StatusCode, Json<Vec<dto::UserOut>>), ApiError> {
    let registrations = body.users.into_iter().map(Into::into).collect();
    let created = services.bulk_register(&principal, registrations)?;
    Ok((StatusCode::CREATED, Json(dto::users_to_json(created))))
}
