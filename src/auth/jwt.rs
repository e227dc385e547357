//! JWT token issuance and validation
//! Tokens are HS512-signed compact JWTs carrying `sub`, `iat` and `exp`

use crate::{clock::Clock, config::AppConfig, error::AppError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Signing algorithm for every token this service issues or accepts
pub const ALGORITHM: Algorithm = Algorithm::HS512;

/// Recommended minimum key length for HS512
const RECOMMENDED_SECRET_LEN: usize = 64;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// Why a token could not be issued or verified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token subject must not be empty")]
    EmptySubject,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature does not verify")]
    BadSignature,

    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnsupportedAlgorithm
            }
            _ => TokenError::Malformed(format!("{:?}", e.kind())),
        }
    }
}

/// Token service
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create token service from config
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }
        if secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                len = secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "JWT secret is shorter than recommended for HS512"
            );
        }

        Ok(Self::new(secret.as_bytes(), config.security.token_ttl_secs, clock))
    }

    pub fn new(secret: &[u8], ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        // Expiry is judged against the injected clock, so the library only
        // checks structure, algorithm and signature.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
            clock,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a token for `subject` valid for the configured TTL
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let now = self.clock.now();
        let expiration = now + Duration::seconds(self.ttl_secs as i64);

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            TokenError::Encoding(e.to_string())
        })
    }

    /// Verify the signature and return the claims, expired or not
    pub fn claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token verification failed: {:?}", e);
                TokenError::from(e)
            })
    }

    /// `Ok(true)` iff the token belongs to `expected_subject` and has not expired.
    /// An unverifiable token is an error, never `Ok(false)`.
    pub fn validate(&self, token: &str, expected_subject: &str) -> Result<bool, TokenError> {
        let claims = self.claims(token)?;
        let expired = self.clock.now().timestamp() >= claims.exp;

        if expired {
            tracing::debug!(sub = %claims.sub, exp = claims.exp, "Token expired");
        }

        Ok(claims.sub == expected_subject && !expired)
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.claims(token)?.sub)
    }

    pub fn extract_expiry(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        let exp = self.claims(token)?.exp;
        DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| TokenError::Malformed(format!("exp out of range: {}", exp)))
    }
}
