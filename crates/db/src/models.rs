//! Row structs and their request schemas.
//!
//! The tables are reflected from the existing database; these structs only
//! describe the columns this service reads and writes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::repository::Repository;
use crate::schema::{double_option, Model};

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

/// A persisted user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

impl Model for User {
    const TABLE: &'static str = "users";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Fields for a new user. Every field is written, `None` as NULL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Partial update. Omitted fields keep their stored value; `"email": null`
/// clears the email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
}

/// Equality filters. Omitted fields are not searched; `Some(None)` matches
/// NULL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
}

pub type UserRepository = Repository<User, UserCreate, UserUpdate, UserQuery>;
