//! Daily work log record and its review status.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult, Entity, LogId, UserId};

/// Upper bound for hours recorded against a single day.
pub const MAX_WORKING_HOURS: f64 = 24.0;

/// Review state of a work log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Pending => "pending",
            LogStatus::Approved => "approved",
            LogStatus::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for LogStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(LogStatus::Pending),
            "approved" => Ok(LogStatus::Approved),
            "rejected" => Ok(LogStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown log status '{other}'"))),
        }
    }
}

/// A single day of work submitted by its owner.
///
/// `status` and `reviewer_id` are only ever changed through a reviewer change
/// set; every other field belongs to the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLog {
    pub id: LogId,
    pub owner_id: UserId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub working_hours: f64,
    pub task_description: String,
    pub status: LogStatus,
    pub reviewer_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner-supplied content for a new log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkLog {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub working_hours: f64,
    pub task_description: String,
}

impl WorkLog {
    /// Create a pending, unreviewed log owned by `owner_id`.
    pub fn create(
        id: LogId,
        owner_id: UserId,
        input: NewWorkLog,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_working_hours(input.working_hours)?;

        Ok(Self {
            id,
            owner_id,
            date: input.date,
            start_time: input.start_time,
            working_hours: input.working_hours,
            task_description: input.task_description.trim().to_string(),
            status: LogStatus::Pending,
            reviewer_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// ISO week number of the logged day.
    pub fn week_number(&self) -> u32 {
        self.date.iso_week().week()
    }

    /// Weekday name of the logged day (e.g. "Mon").
    pub fn day(&self) -> String {
        self.date.weekday().to_string()
    }
}

impl Entity for WorkLog {
    type Id = LogId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn owner(&self) -> Option<UserId> {
        Some(self.owner_id)
    }
}

/// Hours must be a finite value in `0.0..=24.0`.
pub fn validate_working_hours(hours: f64) -> DomainResult<()> {
    if !hours.is_finite() || hours < 0.0 || hours > MAX_WORKING_HOURS {
        return Err(DomainError::validation(format!(
            "working_hours must be between 0 and {MAX_WORKING_HOURS}"
        )));
    }
    Ok(())
}
