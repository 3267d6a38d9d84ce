/*
 * Responsibility
 * - Issue and verify the three token kinds (access / refresh / email)
 * - HS256 over a shared secret; `sub` is the user's email, `scope` pins the
 *   token kind so a refresh token can never pass as an access token
 */
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Access,
    Refresh,
    Email,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Access => "access_token",
            TokenScope::Refresh => "refresh_token",
            TokenScope::Email => "email_token",
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("unexpected token scope")]
    WrongScope,
    #[error("empty subject claim")]
    EmptySub,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    scope: String,
    iat: i64,
    exp: i64,
}

/// Key material is not printable: no Debug derive.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
    email_ttl_seconds: u64,
}

impl JwtCodec {
    pub fn new(
        secret: &str,
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
        email_ttl_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; the TTLs are generous enough without clock slack.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl_seconds,
            refresh_ttl_seconds,
            email_ttl_seconds,
        }
    }

    fn ttl_seconds(&self, scope: TokenScope) -> u64 {
        match scope {
            TokenScope::Access => self.access_ttl_seconds,
            TokenScope::Refresh => self.refresh_ttl_seconds,
            TokenScope::Email => self.email_ttl_seconds,
        }
    }

    /// Sign a token of the given scope for `email`.
    pub fn issue(&self, email: &str, scope: TokenScope) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: email.to_string(),
            scope: scope.as_str().to_string(),
            iat: now,
            exp: now + self.ttl_seconds(scope) as i64,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(
            |e| {
                error!(error = %e, "failed to sign JWT");
                AppError::Internal
            },
        )
    }

    /// Verify signature, expiry, and scope; returns the subject email.
    pub fn verify(&self, token: &str, expected: TokenScope) -> Result<String, JwtError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        if data.claims.scope != expected.as_str() {
            return Err(JwtError::WrongScope);
        }
        if data.claims.sub.trim().is_empty() {
            return Err(JwtError::EmptySub);
        }

        Ok(data.claims.sub)
    }
}
