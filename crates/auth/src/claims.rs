use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use worklog_core::UserId;

use crate::Role;

/// Claim names owned by the codec; callers cannot set them through `extra`.
pub const RESERVED_CLAIMS: [&str; 5] = ["sub", "uid", "role", "iat", "exp"];

/// Session token claims as carried on the wire.
///
/// `sub` is the account email. `role` is the role at issuance time and is not
/// trusted for authorization decisions once the token is verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (account email). Empty when the token carried none.
    #[serde(default)]
    pub sub: String,

    /// Id of the account the token was issued to. Binds the token to that
    /// account so it does not carry over to a later account with the same email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,

    /// Any additional claims supplied at issuance.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// The subject, if it is usable as an account identifier.
    pub fn subject(&self) -> Option<&str> {
        let sub = self.sub.trim();
        (!sub.is_empty()).then_some(sub)
    }
}

/// What a caller asks the codec to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimsInput {
    pub subject: String,
    pub user_id: Option<UserId>,
    pub role: Role,
    pub extra: Map<String, Value>,
}

impl ClaimsInput {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            user_id: None,
            role,
            extra: Map::new(),
        }
    }

    pub fn for_user(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether verified `claims` carry exactly this input.
    pub fn matches(&self, claims: &TokenClaims) -> bool {
        claims.sub == self.subject
            && claims.uid == self.user_id
            && claims.role == Some(self.role) && claims.extra == self.extra
    }
}

/// Authentication failures.
///
/// The variants exist for logging and tests; callers surface all of them as
/// the same "not authenticated" response.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("credential is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token carries no subject")]
    MissingSubject,

    #[error("token subject does not match a known account")]
    UnknownSubject,
}

/// Deterministically validate the time window of verified claims.
///
/// A token is live only while `now < exp`; a zero or negative lifetime is
/// therefore already expired.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), AuthError> {
    if now.timestamp() >= claims.exp {
        return Err(AuthError::Expired);
    }
    Ok(())
}
