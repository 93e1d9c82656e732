use core::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use worklog_auth::{CredentialRecord, Role};
use worklog_core::{DomainError, LogId, LogStatus, UserId, WorkLog};

use crate::app::errors::ApiError;
use crate::app::services::{Registration, ServiceError};

// -------------------------
// Request DTOs
// -------------------------

/// Public self-registration. The role is always `intern`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(value: RegisterRequest) -> Self {
        Registration {
            email: value.email,
            username: value.username,
            password: value.password,
            role: Role::Intern,
        }
    }
}

/// One entry of an admin bulk registration.
#[derive(Debug, Deserialize)]
pub struct AccountRequest {
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl From<AccountRequest> for Registration {
    fn from(value: AccountRequest) -> Self {
        Registration {
            email: value.email,
            username: value.username,
            password: value.password,
            role: value.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkRegisterRequest {
    pub users: Vec<AccountRequest>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub status: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// Account as returned to clients; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: UserId,
    pub email: String,
    pub username: Option<String>,
    pub role: Role,
}

impl From<CredentialRecord> for UserOut {
    fn from(value: CredentialRecord) -> Self {
        Self {
            id: value.id,
            email: value.email,
            username: value.username,
            role: value.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub id: LogId,
    pub owner_id: UserId,
    pub date: NaiveDate,
    pub day: String,
    pub week_number: u32,
    pub start_time: NaiveTime,
    pub working_hours: f64,
    pub task_description: String,
    pub status: LogStatus,
    pub reviewer_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorkLog> for LogResponse {
    fn from(log: WorkLog) -> Self {
        Self {
            day: log.day(),
            week_number: log.week_number(),
            id: log.id,
            owner_id: log.owner_id,
            date: log.date,
            start_time: log.start_time,
            working_hours: log.working_hours,
            task_description: log.task_description,
            status: log.status,
            reviewer_id: log.reviewer_id,
            created_at: log.created_at,
            updated_at: log.updated_at,
        }
    }
}

/// Parse a path identifier; failures become a 400 `invalid_id`.
pub fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>()
        .map_err(|e| ApiError::Service(ServiceError::Domain(e)))
}

pub fn parse_status(raw: Option<&str>) -> Result<Option<LogStatus>, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<LogStatus>().map_err(|_| {
                ApiError::BadRequest(
                    "invalid_status",
                    "status must be one of: pending, approved, rejected".to_string(),
                )
            })
        })
        .transpose()
}

pub fn users_to_json(records: Vec<CredentialRecord>) -> Vec<UserOut> {
    records.into_iter().map(UserOut::from).collect()
}

pub fn logs_to_json(logs: Vec<WorkLog>) -> Vec<LogResponse> {
    logs.into_iter().map(LogResponse::from).collect()
}
