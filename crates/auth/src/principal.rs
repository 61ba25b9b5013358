//! The authenticated identity of a request.

use std::fmt;

use serde::Serialize;

/// A username established by validating a bearer token.
///
/// Immutable once created; the only way to obtain one outside this crate is
/// [`crate::TokenService::validate`] (or [`Principal::new`] in tooling and tests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn username(&self) -> &str {
        &self.0
    }

    pub fn into_username(self) -> String {
        self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
