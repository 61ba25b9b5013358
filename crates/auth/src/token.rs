//! Token service — issue and validate signed, time-limited bearer tokens.
//!
//! The secret and algorithm are process-wide configuration: build one
//! [`TokenService`] at startup and share it (it is cheap to clone behind an
//! `Arc`). Nothing here performs I/O.

use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{AuthError, Principal};

/// Lifetime applied by [`TokenService::issue`] when the caller passes no ttl.
pub const DEFAULT_TTL_MINUTES: i64 = 15;

/// Signing configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret_key: String,
    /// Algorithm name as configured, e.g. `HS256`.
    pub algorithm: String,
}

/// Payload handed back to a client that was just issued a token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Issues and validates JWTs with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
}

impl TokenService {
    /// Build the service from configuration.
    ///
    /// # Errors
    /// [`AuthError::UnsupportedAlgorithm`] unless the algorithm is one of
    /// `HS256`, `HS384` or `HS512`.
    pub fn new(config: &TokenConfig) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(&config.algorithm)
            .map_err(|_| AuthError::UnsupportedAlgorithm(config.algorithm.clone()))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AuthError::UnsupportedAlgorithm(config.algorithm.clone()));
        }

        let mut validation = Validation::new(algorithm);
        // Expiry is exact: a token is dead the second its `exp` passes.
        validation.leeway = 0;
        validation.validate_aud = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            header: Header::new(algorithm),
            validation,
        })
    }

    /// Encode `claims` plus an `exp` of now + `ttl` into a signed token.
    ///
    /// `ttl` defaults to [`DEFAULT_TTL_MINUTES`]. An `exp` already present in
    /// `claims` is overwritten.
    ///
    /// # Errors
    /// [`AuthError::TtlOutOfRange`] when the expiry instant would overflow.
    pub fn issue(&self, claims: &Map<String, Value>, ttl: Option<Duration>) -> Result<String, AuthError> {
        let ttl = ttl.unwrap_or_else(|| Duration::minutes(DEFAULT_TTL_MINUTES));
        let expire = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(AuthError::TtlOutOfRange(ttl))?;

        let mut to_encode = claims.clone();
        to_encode.insert("exp".to_string(), Value::from(expire.timestamp()));

        let token = jsonwebtoken::encode(&self.header, &to_encode, &self.encoding_key)?;
        Ok(token)
    }

    /// Convenience wrapper around [`TokenService::issue`] for a bare subject.
    pub fn issue_for(&self, username: &str, ttl: Option<Duration>) -> Result<String, AuthError> {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), Value::from(username));
        self.issue(&claims, ttl)
    }

    /// Verify signature and expiry, returning the subject as a [`Principal`].
    ///
    /// # Errors
    /// - [`AuthError::ExpiredCredential`] once `exp` has passed.
    /// - [`AuthError::InvalidCredential`] for anything else that is wrong with
    ///   the token, including a missing or empty `sub`.
    pub fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
                _ => {
                    debug!(error = %err, "rejected bearer token");
                    AuthError::InvalidCredential
                }
            })?;

        let username = data
            .claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|sub| !sub.is_empty())
            .ok_or(AuthError::InvalidCredential)?;

        Ok(Principal::new(username))
    }
}
