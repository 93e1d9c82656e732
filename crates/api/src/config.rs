//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use worklog_auth::AuthConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Auth(#[from] worklog_auth::ConfigError),

    #[error("invalid BIND_ADDR: {0}")]
    BindAddr(String),

    #[error("invalid CORS origin: {0}")]
    CorsOrigin(String),

    #[error("ADMIN_EMAIL and ADMIN_PASSWORD must be set together")]
    PartialAdmin,
}

/// Account created at startup so a fresh deployment has an administrator.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<HeaderValue>,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    /// Defaults around an explicit auth config (used by tests).
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            cors_origins: vec![HeaderValue::from_static(DEFAULT_CORS_ORIGIN)],
            admin: None,
        }
    }

    pub fn with_admin(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin = Some(AdminSeed {
            email: email.into(),
            password: password.into(),
        });
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = var("SECRET_KEY").unwrap_or_else(|| {
            tracing::warn!("SECRET_KEY not set; using insecure dev default");
            DEV_SECRET.to_string()
        });
        let auth = AuthConfig::from_parts(
            &secret,
            var("ALGORITHM").as_deref(),
            var("ACCESS_TOKEN_EXPIRE_MINUTES").as_deref(),
        )?;

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::BindAddr(bind_raw.clone()))?;

        let origins_raw = var("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let cors_origins = parse_origins(&origins_raw)?;

        let admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialAdmin),
        };

        Ok(Self {
            auth,
            bind_addr,
            cors_origins,
            admin,
        })
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::CorsOrigin(o.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.auth.token_ttl(), chrono::Duration::minutes(15));
        assert_eq!(config.cors_origins, vec![HeaderValue::from_static(DEFAULT_CORS_ORIGIN)]);
        assert!(config.admin.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SECRET_KEY", "s3cret"),
            ("ALGORITHM", "HS512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "60"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
            ("ADMIN_EMAIL", "root@x.com"),
            ("ADMIN_PASSWORD", "pw"),
        ]))
        .unwrap();

        assert_eq!(config.auth.secret(), b"s3cret");
        assert_eq!(config.auth.algorithm(), jsonwebtoken::Algorithm::HS512);
        assert_eq!(config.auth.token_ttl(), chrono::Duration::minutes(60));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.admin.map(|a| a.email).as_deref(), Some("root@x.com"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "0")])),
            Err(ConfigError::Auth(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("ALGORITHM", "RS256")])),
            Err(ConfigError::Auth(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])),
            Err(ConfigError::BindAddr(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("ADMIN_EMAIL", "root@x.com")])),
            Err(ConfigError::PartialAdmin)
        ));
    }
}
