//! Token signing configuration.
//!
//! Built once at process startup and handed to [`crate::TokenCodec`]; nothing
//! in this crate reads the environment.

use chrono::Duration;
use jsonwebtoken::Algorithm;
use thiserror::Error;

/// Default session lifetime when none is configured.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("unsupported token algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("token ttl must be a positive number of minutes, got '{0}'")]
    InvalidTtl(String),
}

/// Process-wide signing secret, algorithm and default token lifetime.
#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    algorithm: Algorithm,
    token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(
        secret: impl Into<Vec<u8>>,
        algorithm: Algorithm,
        token_ttl: Duration,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ConfigError::UnsupportedAlgorithm(format!("{algorithm:?}")));
        }
        if token_ttl <= Duration::zero() {
            return Err(ConfigError::InvalidTtl(token_ttl.num_minutes().to_string()));
        }

        Ok(Self {
            secret,
            algorithm,
            token_ttl,
        })
    }

    /// HS256 with the default 15 minute lifetime.
    pub fn hs256(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Self::new(
            secret,
            Algorithm::HS256,
            Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        )
    }

    /// Build from the raw string forms used in deployment configuration.
    pub fn from_parts(
        secret: &str,
        algorithm: Option<&str>,
        ttl_minutes: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let algorithm = match algorithm.map(str::trim) {
            None | Some("") => Algorithm::HS256,
            Some(name) => parse_algorithm(name)?,
        };

        let token_ttl = match ttl_minutes.map(str::trim) {
            None | Some("") => Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            Some(raw) => {
                let minutes: i64 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidTtl(raw.to_string()))?;
                if minutes <= 0 {
                    return Err(ConfigError::InvalidTtl(raw.to_string()));
                }
                Duration::minutes(minutes)
            }
        };

        Self::new(secret.as_bytes().to_vec(), algorithm, token_ttl)
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}
