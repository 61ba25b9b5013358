//! `auth` crate — bearer-token issuance and validation.
//!
//! Tokens are stateless signed JWTs carrying a `sub` (the username) and an
//! `exp` instant. There is no revocation list: a token is valid until it
//! expires. Validation yields the [`Principal`] the rest of the service
//! attributes its work to.

pub mod error;
pub mod principal;
pub mod token;

pub use error::AuthError;
pub use principal::Principal;
pub use token::{TokenConfig, TokenResponse, TokenService, DEFAULT_TTL_MINUTES};
