//! Application services: the operations behind each route, independent of HTTP.
//!
//! Every log operation runs in the same order: load the target (404), ask the
//! permission evaluator, then hand the effective change set to the store.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use worklog_auth::{
    ADMIN_ONLY, AuthError, ClaimsInput, CredentialLookup, CredentialRecord, IdentityResolver,
    LogAction, LogRef, LogUpdate, PasswordError, PermissionError, Principal, REVIEWERS, Role,
    TokenCodec, TokenError, authorize, hash_password, require_role, verify_password,
};
use worklog_core::{DomainError, LogId, LogStatus, NewWorkLog, UserId, WorkLog};
use worklog_infra::{
    AccountUpdate, InMemoryLogStore, InMemoryUserStore, LogFilter, LogStore, NewAccount,
    StoreError, UserStore,
};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Registration input before hashing.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: Option<String>,
    pub password: String,
    pub role: Role,
}

/// Password checked when a login names no known account, so unknown emails
/// cost the same Argon2 verification as wrong passwords.
const DUMMY_PASSWORD: &str = "worklog-dummy-password";

pub struct AppServices {
    resolver: IdentityResolver<Arc<dyn UserStore>>,
    users: Arc<dyn UserStore>,
    logs: Arc<dyn LogStore>,
    dummy_hash: String,
}

impl AppServices {
    pub fn new(codec: TokenCodec, users: Arc<dyn UserStore>, logs: Arc<dyn LogStore>) -> Self {
        Self {
            resolver: IdentityResolver::new(codec, users.clone()),
            users,
            logs,
            dummy_hash: hash_password(DUMMY_PASSWORD).unwrap_or_default(),
        }
    }

    /// In-memory wiring, seeding the configured administrator if any.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let services = Self::new(
            TokenCodec::new(&config.auth),
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryLogStore::new()),
        );

        if let Some(seed) = &config.admin {
            let admin = services.register(Registration {
                email: seed.email.clone(),
                username: None,
                password: seed.password.clone(),
                role: Role::Admin,
            })?;
            tracing::info!(user_id = %admin.id, "seeded admin account");
        }

        Ok(services)
    }

    // ─── Identity ───

    pub fn resolve(&self, raw_token: &str) -> Result<Principal, AuthError> {
        self.resolver.resolve(raw_token)
    }

    pub fn register(&self, registration: Registration) -> Result<CredentialRecord, ServiceError> {
        if registration.password.is_empty() {
            return Err(DomainError::validation("password cannot be empty").into());
        }
        let password_hash = hash_password(&registration.password)?;

        let record = self.users.create(NewAccount {
            email: registration.email,
            username: registration.username,
            password_hash,
            role: registration.role,
        })?;
        Ok(record)
    }

    /// Verify credentials and issue a session token for the account.
    pub fn login(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let record = self.users.find_by_email(email);
        let hash = record
            .as_ref()
            .map_or(self.dummy_hash.as_str(), |r| r.password_hash.as_str());
        let verified = verify_password(password, hash);
        let record = record
            .filter(|_| verified)
            .ok_or(ServiceError::InvalidCredentials)?;

        let claims = ClaimsInput::new(record.email.clone(), record.role).for_user(record.id);
        let token = self.resolver.codec().issue(&claims, None)?;
        tracing::info!(user_id = %record.id, "login succeeded");
        Ok(token)
    }

    pub fn account(&self, principal: &Principal) -> Result<CredentialRecord, ServiceError> {
        Ok(self.users.get(principal.user_id).ok_or(StoreError::NotFound)?)
    }

    // ─── Logs ───

    pub fn create_log(&self, principal: &Principal, input: NewWorkLog) -> Result<WorkLog, ServiceError> {
        let log = WorkLog::create(LogId::new(), principal.user_id, input, Utc::now())?;
        Ok(self.logs.insert(log)?)
    }

    pub fn own_logs(&self, principal: &Principal) -> Vec<WorkLog> {
        self.logs.list(LogFilter::owned_by(principal.user_id))
    }

    pub fn review_queue(
        &self,
        principal: &Principal,
        status: Option<LogStatus>,
    ) -> Result<Vec<WorkLog>, ServiceError> {
        require_role(principal, REVIEWERS).into_result()?;
        Ok(self.logs.list(LogFilter {
            owner_id: None,
            status,
        }))
    }

    pub fn get_log(&self, principal: &Principal, id: LogId) -> Result<WorkLog, ServiceError> {
        let log = self.logs.get(id).ok_or(StoreError::NotFound)?;
        authorize(principal, LogAction::Read, &LogRef::from(&log), &LogUpdate::default())
            .into_result()?;
        Ok(log)
    }

    pub fn update_log(
        &self,
        principal: &Principal,
        id: LogId,
        requested: &LogUpdate,
    ) -> Result<WorkLog, ServiceError> {
        let log = self.logs.get(id).ok_or(StoreError::NotFound)?;
        let changes =
            authorize(principal, LogAction::Update, &LogRef::from(&log), requested).into_result()?;

        if changes.is_empty() {
            return Ok(log);
        }
        Ok(self.logs.apply(id, &changes, Utc::now())?)
    }

    // ─── Admin ───

    pub fn list_accounts(&self, principal: &Principal) -> Result<Vec<CredentialRecord>, ServiceError> {
        require_role(principal, ADMIN_ONLY).into_result()?;
        Ok(self.users.list())
    }

    pub fn update_account(
        &self,
        principal: &Principal,
        id: UserId,
        update: &AccountUpdate,
    ) -> Result<CredentialRecord, ServiceError> {
        require_role(principal, ADMIN_ONLY).into_result()?;
        let record = self.users.update(id, update)?;
        tracing::info!(admin_id = %principal.user_id, user_id = %id, role = %record.role, "account updated");
        Ok(record)
    }

    /// Delete an account together with every log it owns.
    pub fn delete_account(&self, principal: &Principal, id: UserId) -> Result<(), ServiceError> {
        require_role(principal, ADMIN_ONLY).into_result()?;
        self.users.delete(id)?;
        let removed_logs = self.logs.delete_owned_by(id);
        tracing::info!(admin_id = %principal.user_id, user_id = %id, removed_logs, "account deleted");
        Ok(())
    }

    /// Register each entry in order, skipping any that fail (duplicates included).
    pub fn bulk_register(
        &self,
        principal: &Principal,
        registrations: Vec<Registration>,
    ) -> Result<Vec<CredentialRecord>, ServiceError> {
        require_role(principal, ADMIN_ONLY).into_result()?;

        let requested = registrations.len();
        let mut created = Vec::with_capacity(requested);
        for registration in registrations {
            let email = registration.email.clone();
            match self.register(registration) {
                Ok(record) => created.push(record),
                Err(e) => tracing::info!(email = %email, reason = %e, "skipped bulk registration entry"),
            }
        }

        tracing::info!(
            admin_id = %principal.user_id,
            requested,
            created = created.len(),
            "bulk registration finished"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use worklog_auth::AuthConfig;

    use super::*;

    fn services() -> AppServices {
        AppServices::from_config(&AppConfig::new(AuthConfig::hs256("test-secret").unwrap())).unwrap()
    }

    fn register(services: &AppServices, email: &str, role: Role) -> Principal {
        let record = services
            .register(Registration {
                email: email.to_string(),
                username: None,
                password: "pw".to_string(),
                role,
            })
            .unwrap();
        Principal::new(record.id, record.email, record.role)
    }

    fn new_log() -> NewWorkLog {
        NewWorkLog {
            date: NaiveDate::from_ymd_opt(2024, 3, 21).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            working_hours: 8.0,
            task_description: "wrote tests".to_string(),
        }
    }

    #[test]
    fn login_issues_token_that_resolves_to_the_account() {
        let services = services();
        let alice = register(&services, "a@x.com", Role::Intern);

        let token = services.login("a@x.com", "pw").unwrap();
        assert_eq!(services.resolve(&token).unwrap(), alice);

        assert!(matches!(
            services.login("a@x.com", "wrong"),
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            services.login("nobody@x.com", "pw"),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn unknown_email_is_checked_against_a_real_hash() {
        let services = services();
        assert!(services.dummy_hash.starts_with("$argon2id$"));
        assert!(verify_password(DUMMY_PASSWORD, &services.dummy_hash));

        // The dummy password never matches an account that does not exist.
        assert!(matches!(
            services.login("nobody@x.com", DUMMY_PASSWORD),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn old_token_is_rejected_after_email_is_reused() {
        let services = services();
        let admin = register(&services, "root@x.com", Role::Admin);
        let alice = register(&services, "a@x.com", Role::Admin);
        let stale = services.login("a@x.com", "pw").unwrap();

        services.delete_account(&admin, alice.user_id).unwrap();
        let reborn = register(&services, "a@x.com", Role::Intern);
        assert_ne!(reborn.user_id, alice.user_id);

        assert_eq!(services.resolve(&stale), Err(AuthError::UnknownSubject));
        let fresh = services.login("a@x.com", "pw").unwrap();
        assert_eq!(services.resolve(&fresh).unwrap(), reborn);
    }

    #[test]
    fn missing_log_is_reported_before_permission() {
        let services = services();
        let intern = register(&services, "a@x.com", Role::Intern);

        let err = services
            .update_log(&intern, LogId::new(), &LogUpdate::default())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::NotFound)));
    }

    #[test]
    fn intern_cannot_read_or_approve_logs() {
        let services = services();
        let alice = register(&services, "a@x.com", Role::Intern);
        let bob = register(&services, "b@x.com", Role::Intern);
        let log = services.create_log(&alice, new_log()).unwrap();

        assert!(matches!(
            services.get_log(&bob, log.id),
            Err(ServiceError::Permission(PermissionError::NotOwner))
        ));

        let approve = LogUpdate {
            status: Some(LogStatus::Approved),
            ..Default::default()
        };
        assert!(matches!(
            services.update_log(&alice, log.id, &approve),
            Err(ServiceError::Permission(PermissionError::FieldForbidden))
        ));
        assert_eq!(services.get_log(&alice, log.id).unwrap().status, LogStatus::Pending);
    }

    #[test]
    fn supervisor_review_stamps_reviewer() {
        let services = services();
        let alice = register(&services, "a@x.com", Role::Intern);
        let boss = register(&services, "boss@x.com", Role::Supervisor);
        let log = services.create_log(&alice, new_log()).unwrap();

        let reviewed = services
            .update_log(
                &boss,
                log.id,
                &LogUpdate {
                    status: Some(LogStatus::Approved),
                    working_hours: Some(1.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(reviewed.status, LogStatus::Approved);
        assert_eq!(reviewed.reviewer_id, Some(boss.user_id));
        assert_eq!(reviewed.working_hours, 8.0);

        let queue = services.review_queue(&boss, Some(LogStatus::Pending)).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn deleting_an_account_cascades_to_its_logs() {
        let services = services();
        let admin = register(&services, "root@x.com", Role::Admin);
        let alice = register(&services, "a@x.com", Role::Intern);
        services.create_log(&alice, new_log()).unwrap();

        services.delete_account(&admin, alice.user_id).unwrap();
        assert!(services.review_queue(&admin, None).unwrap().is_empty());
        assert!(matches!(
            services.login("a@x.com", "pw"),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn bulk_register_skips_duplicates() {
        let services = services();
        let admin = register(&services, "root@x.com", Role::Admin);
        let entry = |email: &str| Registration {
            email: email.to_string(),
            username: None,
            password: "pw".to_string(),
            role: Role::Intern,
        };

        let created = services
            .bulk_register(&admin, vec![entry("a@x.com"), entry("root@x.com"), entry("a@x.com")])
            .unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].email, "a@x.com");

        let intern = Principal::new(created[0].id, "a@x.com", Role::Intern);
        assert!(matches!(
            services.bulk_register(&intern, vec![entry("c@x.com")]),
            Err(ServiceError::Permission(PermissionError::RoleInsufficient))
        ));
    }
}
