//! Field-level authorization for work logs, plus the coarse role gate.
//!
//! - No IO
//! - No panics
//! - No storage concerns: existence and uniqueness are checked by the caller
//!   around the decision.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use worklog_core::{DomainResult, LogId, LogStatus, UserId, WorkLog, worklog::validate_working_hours};

use crate::{Principal, Role};

/// Roles allowed to manage accounts.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Roles allowed to review logs.
pub const REVIEWERS: &[Role] = &[Role::Supervisor, Role::Admin];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PermissionError {
    #[error("not the owner of this resource")]
    NotOwner,

    #[error("role is insufficient for this action")]
    RoleInsufficient,

    #[error("request touches a field the caller may not change")]
    FieldForbidden,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<T> {
    Allow(T),
    Deny(PermissionError),
}

impl<T> Decision<T> {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }

    pub fn into_result(self) -> Result<T, PermissionError> {
        match self {
            Decision::Allow(v) => Ok(v),
            Decision::Deny(e) => Err(e),
        }
    }
}

/// What the caller wants to do with a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    Read,
    Update,
}

/// The facts about a log that authorization depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRef {
    pub id: LogId,
    pub owner_id: UserId,
}

impl From<&WorkLog> for LogRef {
    fn from(log: &WorkLog) -> Self {
        Self {
            id: log.id,
            owner_id: log.owner_id,
        }
    }
}

/// A requested partial update, exactly as submitted.
///
/// Absent fields mean "leave unchanged"; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogUpdate {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub working_hours: Option<f64>,
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub status: Option<LogStatus>,
    #[serde(default)]
    pub reviewer_id: Option<UserId>,
}

impl LogUpdate {
    fn touches_review_fields(&self) -> bool {
        self.status.is_some() || self.reviewer_id.is_some()
    }

    fn content(&self) -> ContentChanges {
        ContentChanges {
            date: self.date,
            start_time: self.start_time,
            working_hours: self.working_hours,
            task_description: self.task_description.clone(),
        }
    }
}

/// Owner-editable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentChanges {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub working_hours: Option<f64>,
    pub task_description: Option<String>,
}

impl ContentChanges {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.start_time.is_none()
            && self.working_hours.is_none()
            && self.task_description.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(hours) = self.working_hours {
            validate_working_hours(hours)?;
        }
        Ok(())
    }
}

/// Reviewer-editable fields. The reviewer is always the acting principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewChanges {
    pub status: Option<LogStatus>,
    pub reviewer_id: UserId,
}

/// The effective change set: what may actually be written.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LogChangeSet {
    #[default]
    Empty,
    Content(ContentChanges),
    Review(ReviewChanges),
}

impl LogChangeSet {
    pub fn is_empty(&self) -> bool {
        matches!(self, LogChangeSet::Empty)
    }

    pub fn validate(&self) -> DomainResult<()> {
        match self {
            LogChangeSet::Content(c) => c.validate(),
            LogChangeSet::Empty | LogChangeSet::Review(_) => Ok(()),
        }
    }

    /// Apply to `log`, touching only the fields this set carries.
    pub fn apply_to(&self, log: &mut WorkLog, now: DateTime<Utc>) {
        match self {
            LogChangeSet::Empty => return,
            LogChangeSet::Content(c) => {
                if let Some(date) = c.date {
                    log.date = date;
                }
                if let Some(start_time) = c.start_time {
                    log.start_time = start_time;
                }
                if let Some(hours) = c.working_hours {
                    log.working_hours = hours;
                }
                if let Some(desc) = &c.task_description {
                    log.task_description = desc.trim().to_string();
                }
            }
            LogChangeSet::Review(r) => {
                if let Some(status) = r.status {
                    log.status = status;
                }
                log.reviewer_id = Some(r.reviewer_id);
            }
        }
        log.updated_at = now;
    }
}

/// Decide whether `principal` may perform `action` on `resource`, and which
/// of the `requested` changes take effect.
///
/// Reviewers (supervisor/admin) always take the reviewer path, even on their
/// own logs: only `status` is honoured and `reviewer_id` is stamped with the
/// reviewer's own id; content edits are dropped. Owners without a reviewer
/// role may change content only, and any attempt to touch `status` or
/// `reviewer_id` denies the whole request.
pub fn authorize(
    principal: &Principal,
    action: LogAction,
    resource: &LogRef,
    requested: &LogUpdate,
) -> Decision<LogChangeSet> {
    if principal.is_reviewer() {
        return match action {
            LogAction::Read => Decision::Allow(LogChangeSet::Empty),
            LogAction::Update => Decision::Allow(review_changes(principal, requested)),
        };
    }

    if resource.owner_id != principal.user_id {
        return Decision::Deny(PermissionError::NotOwner);
    }

    match action {
        LogAction::Read => Decision::Allow(LogChangeSet::Empty),
        LogAction::Update => {
            if requested.touches_review_fields() {
                return Decision::Deny(PermissionError::FieldForbidden);
            }
            let content = requested.content();
            if content.is_empty() {
                Decision::Allow(LogChangeSet::Empty)
            } else {
                Decision::Allow(LogChangeSet::Content(content))
            }
        }
    }
}

fn review_changes(principal: &Principal, requested: &LogUpdate) -> LogChangeSet {
    if !requested.touches_review_fields() {
        return LogChangeSet::Empty;
    }
    LogChangeSet::Review(ReviewChanges {
        status: requested.status,
        reviewer_id: principal.user_id,
    })
}

/// Coarse role gate for actions without field-level policy.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Decision<()> {
    if allowed.contains(&principal.role) {
        Decision::Allow(())
    } else {
        Decision::Deny(PermissionError::RoleInsufficient)
    }
}
