//! Typed error type for the auth crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The token's `exp` instant has passed.
    #[error("token expired")]
    ExpiredCredential,

    /// Malformed token, bad signature, algorithm mismatch or missing subject.
    #[error("could not validate credentials")]
    InvalidCredential,

    /// Only the HMAC family is accepted for a shared secret.
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// `now + ttl` does not fit in a timestamp.
    #[error("token ttl out of range: {0}")]
    TtlOutOfRange(chrono::Duration),

    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}
