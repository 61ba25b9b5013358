//! Typed error types for the db crate.
//!
//! [`DbError`] is the low-level failure of a single statement or conversion.
//! [`CrudError`] is the taxonomy handed to the HTTP boundary: every variant
//! knows the acting username, a default status and an operation-specific
//! message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("schema serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A schema serialized to something other than a field mapping.
    #[error("schema `{0}` does not serialize to a field mapping")]
    NotAnObject(&'static str),

    #[error("invalid SQL identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("table '{0}' not found in the reflected schema")]
    MissingTable(String),
}

/// Failures of a repository operation, attributed to the acting username.
#[derive(Debug, Error)]
pub enum CrudError {
    /// The insert could not be completed.
    #[error("Conflict, object could not be created")]
    Create { username: String },

    /// Nothing matched the lookup.
    #[error("Not selected, reference object not found, ReferenceObject<{reference}>")]
    Select { username: String, reference: String },

    /// Target row absent, or the update transaction failed.
    #[error("Not updated, reference object not found, ReferenceObject<{id}>")]
    Update {
        username: String,
        id: i64,
        #[source]
        cause: Option<DbError>,
    },

    /// Target row absent, or the delete transaction failed.
    #[error("Not deleted, reference object not found, ReferenceObject<{id}>")]
    Delete {
        username: String,
        id: i64,
        #[source]
        cause: Option<DbError>,
    },

    /// A read could not reach the database.
    #[error("Storage unavailable")]
    Storage {
        username: String,
        #[source]
        source: DbError,
    },
}

impl CrudError {
    /// Default HTTP-style status for the failure.
    ///
    /// Not-found class is 404, conflict class (a write that reached the
    /// database and failed there) is 409, I/O on reads is 500.
    pub fn status(&self) -> u16 {
        match self {
            Self::Create { .. } => 409,
            Self::Select { .. } => 404,
            Self::Update { cause: None, .. } | Self::Delete { cause: None, .. } => 404,
            Self::Update { cause: Some(_), .. } | Self::Delete { cause: Some(_), .. } => 409,
            Self::Storage { .. } => 500,
        }
    }

    /// The principal the failure is attributed to.
    pub fn username(&self) -> &str {
        match self {
            Self::Create { username }
            | Self::Select { username, .. }
            | Self::Update { username, .. }
            | Self::Delete { username, .. }
            | Self::Storage { username, .. } => username,
        }
    }
}
