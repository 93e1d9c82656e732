//! Session token codec (JWT compact serialization, HMAC-signed).
//!
//! The codec is stateless: validity is entirely self-contained in the token,
//! so there is no session table and no revocation. Rotating the configured
//! secret invalidates every previously issued token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::claims::{AuthError, ClaimsInput, RESERVED_CLAIMS, TokenClaims, validate_claims};
use crate::config::AuthConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("claim '{0}' is reserved and cannot be supplied as an extra claim")]
    ReservedClaim(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies signed, time-limited session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    header: Header,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let algorithm = config.algorithm();

        // Expiry is checked by `validate_claims` so that `now == exp` counts
        // as expired and no leeway applies.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            header: Header::new(algorithm),
            encoding: EncodingKey::from_secret(config.secret()),
            decoding: DecodingKey::from_secret(config.secret()),
            validation,
            default_ttl: config.token_ttl(),
        }
    }

    /// Issue a token that expires `ttl` (or the configured default) from now.
    pub fn issue(&self, claims: &ClaimsInput, ttl: Option<Duration>) -> Result<String, TokenError> {
        self.issue_at(claims, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        claims: &ClaimsInput,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if let Some(key) = claims.extra.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
            return Err(TokenError::ReservedClaim(key.clone()));
        }

        let iat = now.timestamp();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let payload = TokenClaims {
            sub: claims.subject.clone(),
            uid: claims.user_id,
            role: Some(claims.role),
            iat,
            exp: iat.saturating_add(ttl.num_seconds()),
            extra: claims.extra.clone(),
        };

        jsonwebtoken::encode(&self.header, &payload, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims unchanged.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        if !is_dotted(token) {
            return Err(AuthError::Malformed);
        }

        // From here on the input is treated as an altered token, so any decode
        // failure short of the payload JSON is a bad signature.
        if jsonwebtoken::decode_header(token).is_err() {
            return Err(AuthError::BadSignature);
        }

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                // Payload decoding only happens after the signature checked out.
                ErrorKind::Json(_) | ErrorKind::Utf8(_) => AuthError::Malformed,
                _ => AuthError::BadSignature,
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.header.alg)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

/// Anything without a segment separator is not a compact token at all.
fn is_dotted(token: &str) -> bool {
    !token.trim().is_empty() && token.contains('.')
}
