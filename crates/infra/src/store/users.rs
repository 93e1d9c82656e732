use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Deserialize;

use worklog_auth::{CredentialLookup, CredentialRecord, Role};
use worklog_core::UserId;

use super::StoreError;

/// Fields for a new account. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// Admin-driven partial account update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccountUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Account storage. Email and username are unique across all accounts.
pub trait UserStore: CredentialLookup {
    fn create(&self, account: NewAccount) -> Result<CredentialRecord, StoreError>;
    fn get(&self, id: UserId) -> Option<CredentialRecord>;
    fn list(&self) -> Vec<CredentialRecord>;
    fn update(&self, id: UserId, update: &AccountUpdate) -> Result<CredentialRecord, StoreError>;
    fn delete(&self, id: UserId) -> Result<CredentialRecord, StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn create(&self, account: NewAccount) -> Result<CredentialRecord, StoreError> {
        (**self).create(account)
    }

    fn get(&self, id: UserId) -> Option<CredentialRecord> {
        (**self).get(id)
    }

    fn list(&self) -> Vec<CredentialRecord> {
        (**self).list()
    }

    fn update(&self, id: UserId, update: &AccountUpdate) -> Result<CredentialRecord, StoreError> {
        (**self).update(id, update)
    }

    fn delete(&self, id: UserId) -> Result<CredentialRecord, StoreError> {
        (**self).delete(id)
    }
}

/// In-memory account store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, CredentialRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn normalize_email(email: &str) -> Result<String, StoreError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(StoreError::Validation("invalid email format".to_string())),
    }
}

fn normalize_username(username: &str) -> Result<String, StoreError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(StoreError::Validation("username cannot be empty".to_string()));
    }
    Ok(username.to_string())
}

fn ensure_unique(
    map: &HashMap<UserId, CredentialRecord>,
    except: Option<UserId>,
    email: Option<&str>,
    username: Option<&str>,
) -> Result<(), StoreError> {
    for record in map.values().filter(|r| Some(r.id) != except) {
        if email.is_some_and(|e| record.email == e) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        if username.is_some() && record.username.as_deref() == username {
            return Err(StoreError::Conflict("username already taken".to_string()));
        }
    }
    Ok(())
}

impl CredentialLookup for InMemoryUserStore {
    fn find_by_email(&self, email: &str) -> Option<CredentialRecord> {
        let email = email.trim().to_lowercase();
        let map = self.inner.read().ok()?;
        map.values().find(|r| r.email == email).cloned()
    }
}

impl UserStore for InMemoryUserStore {
    fn create(&self, account: NewAccount) -> Result<CredentialRecord, StoreError> {
        let email = normalize_email(&account.email)?;
        let username = account.username.as_deref().map(normalize_username).transpose()?;

        let mut map = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        ensure_unique(&map, None, Some(&email), username.as_deref())?;

        let record = CredentialRecord {
            id: UserId::new(),
            email,
            username,
            password_hash: account.password_hash,
            role: account.role,
        };
        map.insert(record.id, record.clone());
        Ok(record)
    }

    fn get(&self, id: UserId) -> Option<CredentialRecord> {
        let map = self.inner.read().ok()?;
        map.get(&id).cloned()
    }

    fn list(&self) -> Vec<CredentialRecord> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        let mut records: Vec<CredentialRecord> = map.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    fn update(&self, id: UserId, update: &AccountUpdate) -> Result<CredentialRecord, StoreError> {
        let email = update.email.as_deref().map(normalize_email).transpose()?;
        let username = update.username.as_deref().map(normalize_username).transpose()?;

        let mut map = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        if !map.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        ensure_unique(&map, Some(id), email.as_deref(), username.as_deref())?;

        let record = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(email) = email {
            record.email = email;
        }
        if let Some(username) = username {
            record.username = Some(username);
        }
        if let Some(role) = update.role {
            record.role = role;
        }
        Ok(record.clone())
    }

    fn delete(&self, id: UserId) -> Result<CredentialRecord, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        map.remove(&id).ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str, username: Option<&str>) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            username: username.map(str::to_string),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Intern,
        }
    }

    #[test]
    fn create_normalizes_and_enforces_uniqueness() {
        let store = InMemoryUserStore::new();
        let alice = store.create(account(" Alice@Example.com ", Some("alice"))).unwrap();
        assert_eq!(alice.email, "alice@example.com");

        assert_eq!(
            store.create(account("alice@example.com", None)).unwrap_err(),
            StoreError::Conflict("email already registered".to_string())
        );
        assert_eq!(
            store.create(account("other@example.com", Some("alice"))).unwrap_err(),
            StoreError::Conflict("username already taken".to_string())
        );

        // Accounts without a username never collide on it.
        store.create(account("b@example.com", None)).unwrap();
        store.create(account("c@example.com", None)).unwrap();
        assert_eq!(store.list().len(), 3);
    }

    #[test]
    fn rejects_invalid_email() {
        let store = InMemoryUserStore::new();
        assert!(matches!(
            store.create(account("not-an-email", None)),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let store = InMemoryUserStore::new();
        let created = store.create(account("a@x.com", None)).unwrap();
        assert_eq!(store.find_by_email("A@X.COM").map(|r| r.id), Some(created.id));
        assert!(store.find_by_email("b@x.com").is_none());
    }

    #[test]
    fn update_is_partial_and_checks_conflicts() {
        let store = InMemoryUserStore::new();
        let a = store.create(account("a@x.com", Some("a"))).unwrap();
        store.create(account("b@x.com", Some("b"))).unwrap();

        let promoted = store
            .update(
                a.id,
                &AccountUpdate {
                    role: Some(Role::Supervisor),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(promoted.role, Role::Supervisor);
        assert_eq!(promoted.email, "a@x.com");
        assert_eq!(promoted.username.as_deref(), Some("a"));

        let clash = AccountUpdate {
            username: Some("b".to_string()),
            ..Default::default()
        };
        assert!(matches!(store.update(a.id, &clash), Err(StoreError::Conflict(_))));

        // Re-asserting one's own email is not a conflict.
        let same = AccountUpdate {
            email: Some("a@x.com".to_string()),
            ..Default::default()
        };
        assert!(store.update(a.id, &same).is_ok());

        assert_eq!(
            store.update(UserId::new(), &same).unwrap_err(),
            StoreError::NotFound
        );
    }

    #[test]
    fn delete_removes_account() {
        let store = InMemoryUserStore::new();
        let a = store.create(account("a@x.com", None)).unwrap();
        assert_eq!(store.delete(a.id).unwrap().id, a.id);
        assert!(store.get(a.id).is_none());
        assert_eq!(store.delete(a.id).unwrap_err(), StoreError::NotFound);
    }
}
