//! Identity resolution: bearer credential → verified token → principal.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use worklog_core::UserId;

use crate::claims::AuthError;
use crate::token::TokenCodec;
use crate::{Principal, Role};

/// Stored account credentials, as exposed by the user store.
///
/// `password_hash` is a PHC string produced by [`crate::hash_password`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: UserId,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// Read access to account records by email.
pub trait CredentialLookup: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<CredentialRecord>;
}

impl<S> CredentialLookup for Arc<S>
where
    S: CredentialLookup + ?Sized,
{
    fn find_by_email(&self, email: &str) -> Option<CredentialRecord> {
        (**self).find_by_email(email)
    }
}

/// Turns raw bearer tokens into principals.
///
/// The role on the returned principal is always the one currently stored for
/// the account; the role claim inside the token is ignored, so demotions take
/// effect on the next request rather than at token expiry. A token bound to an
/// account id (`uid`) only resolves while that same account holds the email.
#[derive(Debug, Clone)]
pub struct IdentityResolver<L> {
    codec: TokenCodec,
    lookup: L,
}

impl<L: CredentialLookup> IdentityResolver<L> {
    pub fn new(codec: TokenCodec, lookup: L) -> Self {
        Self { codec, lookup }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn resolve(&self, raw_token: &str) -> Result<Principal, AuthError> {
        let result = self.resolve_inner(raw_token);
        if let Err(e) = &result {
            tracing::debug!(reason = ?e, "credential rejected");
        }
        result
    }

    fn resolve_inner(&self, raw_token: &str) -> Result<Principal, AuthError> {
        let claims = self.codec.verify(raw_token)?;
        let subject = claims.subject().ok_or(AuthError::MissingSubject)?;

        let record = self
            .lookup
            .find_by_email(subject)
            .ok_or(AuthError::UnknownSubject)?;
        if claims.uid.is_some_and(|uid| uid != record.id) {
            return Err(AuthError::UnknownSubject);
        }

        Ok(Principal::new(record.id, record.email, record.role))
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; anything other than a non-empty
/// bearer credential is malformed.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::Malformed)?.trim();

    let (scheme, token) = header.split_once(' ').ok_or(AuthError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::Malformed);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Malformed);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    use chrono::Duration;

    use crate::{AuthConfig, ClaimsInput};

    #[derive(Default)]
    struct Accounts(RwLock<HashMap<String, CredentialRecord>>);

    impl Accounts {
        fn insert(&self, email: &str, role: Role) -> UserId {
            let id = UserId::new();
            self.0.write().unwrap().insert(
                email.to_string(),
                CredentialRecord {
                    id,
                    email: email.to_string(),
                    username: None,
                    password_hash: "$argon2id$unused".to_string(),
                    role,
                },
            );
            id
        }
    }

    impl Accounts {
        fn remove(&self, email: &str) {
            self.0.write().unwrap().remove(email);
        }
    }

    impl CredentialLookup for Accounts {
        fn find_by_email(&self, email: &str) -> Option<CredentialRecord> {
            self.0.read().unwrap().get(email).cloned()
        }
    }

    fn resolver() -> (IdentityResolver<Arc<Accounts>>, Arc<Accounts>) {
        let accounts = Arc::new(Accounts::default());
        let codec = TokenCodec::new(&AuthConfig::hs256("resolver-secret").unwrap());
        (IdentityResolver::new(codec, accounts.clone()), accounts)
    }

    #[test]
    fn resolves_known_subject() {
        let (resolver, accounts) = resolver();
        let id = accounts.insert("a@x.com", Role::Intern);
        let token = resolver
            .codec()
            .issue(&ClaimsInput::new("a@x.com", Role::Intern), None)
            .unwrap();

        let principal = resolver.resolve(&token).unwrap();
        assert_eq!(principal, Principal::new(id, "a@x.com", Role::Intern));
    }

    #[test]
    fn stored_role_wins_over_token_role() {
        let (resolver, accounts) = resolver();
        accounts.insert("boss@x.com", Role::Intern);
        let token = resolver
            .codec()
            .issue(&ClaimsInput::new("boss@x.com", Role::Admin), None)
            .unwrap();

        assert_eq!(resolver.resolve(&token).unwrap().role, Role::Intern);
    }

    #[test]
    fn unknown_and_missing_subjects_are_rejected() {
        let (resolver, _accounts) = resolver();

        let ghost = resolver
            .codec()
            .issue(&ClaimsInput::new("ghost@x.com", Role::Intern), None)
            .unwrap();
        assert_eq!(resolver.resolve(&ghost), Err(AuthError::UnknownSubject));

        let blank = resolver
            .codec()
            .issue(&ClaimsInput::new("  ", Role::Intern), None)
            .unwrap();
        assert_eq!(resolver.resolve(&blank), Err(AuthError::MissingSubject));
    }

    #[test]
    fn token_does_not_carry_over_to_a_recreated_account() {
        let (resolver, accounts) = resolver();
        let old_id = accounts.insert("a@x.com", Role::Admin);
        let token = resolver
            .codec()
            .issue(&ClaimsInput::new("a@x.com", Role::Admin).for_user(old_id), None)
            .unwrap();
        assert_eq!(resolver.resolve(&token).unwrap().user_id, old_id);

        accounts.remove("a@x.com");
        let new_id = accounts.insert("a@x.com", Role::Intern);
        assert_ne!(new_id, old_id);
        assert_eq!(resolver.resolve(&token), Err(AuthError::UnknownSubject));

        let fresh = resolver
            .codec()
            .issue(&ClaimsInput::new("a@x.com", Role::Intern).for_user(new_id), None)
            .unwrap();
        assert_eq!(resolver.resolve(&fresh).unwrap().user_id, new_id);
    }

    #[test]
    fn codec_failures_propagate() {
        let (resolver, accounts) = resolver();
        accounts.insert("a@x.com", Role::Intern);
        let expired = resolver
            .codec()
            .issue(&ClaimsInput::new("a@x.com", Role::Intern), Some(Duration::zero()))
            .unwrap();

        assert_eq!(resolver.resolve(&expired), Err(AuthError::Expired));
        assert_eq!(resolver.resolve("garbage"), Err(AuthError::Malformed));
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer(Some("bearer   tok ")), Ok("tok"));
        assert_eq!(extract_bearer(None), Err(AuthError::Malformed));
        assert_eq!(extract_bearer(Some("Basic dXNlcjpwYXNz")), Err(AuthError::Malformed));
        assert_eq!(extract_bearer(Some("Bearer ")), Err(AuthError::Malformed));
        assert_eq!(extract_bearer(Some("Bearer")), Err(AuthError::Malformed));
    }
}
