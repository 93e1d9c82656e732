//! Credential hashing, session tokens, identity resolution and the log
//! permission policy.
//!
//! This crate is intentionally decoupled from HTTP and storage: the user store
//! is reached only through [`CredentialLookup`].

pub mod authorize;
pub mod claims;
pub mod config;
pub mod password;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod token;

pub use authorize::{
    ADMIN_ONLY, ContentChanges, Decision, LogAction, LogChangeSet, LogRef, LogUpdate,
    PermissionError, REVIEWERS, ReviewChanges, authorize, require_role,
};
pub use claims::{AuthError, ClaimsInput, TokenClaims, validate_claims};
pub use config::{AuthConfig, ConfigError};
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use resolver::{CredentialLookup, CredentialRecord, IdentityResolver, extract_bearer};
pub use roles::{Role, UnknownRole};
pub use token::{TokenCodec, TokenError};
