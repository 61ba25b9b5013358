//! Capabilities the generic repository needs from models and schemas.
//!
//! A model is a row type that knows its table. A schema is any `Serialize`
//! struct: its serialized fields are the columns it sets, filters or patches.
//! Fields the schema skips while serializing are "unset" and impose nothing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use crate::DbError;

/// A persisted row, identified by an integer primary key column named `id`.
pub trait Model: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + std::fmt::Debug {
    /// Table the rows live in.
    const TABLE: &'static str;

    fn id(&self) -> i64;
}

/// Serialize a schema into its explicitly set fields.
pub fn fields_of<S: Serialize>(schema: &S) -> Result<Map<String, Value>, DbError> {
    match serde_json::to_value(schema)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(DbError::NotAnObject(std::any::type_name::<S>())),
    }
}

/// Deserialize `Option<Option<T>>` so that a present `null` is `Some(None)`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: an
/// absent key stays `None` (unset), `null` means "the NULL value".
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Validate a column or table name and return it double-quoted.
pub(crate) fn quote_ident(name: &str) -> Result<String, DbError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(DbError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{name}\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize, Deserialize, Default)]
    struct Patch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
        email: Option<Option<String>>,
    }

    #[test]
    fn unset_fields_are_skipped() {
        let fields = fields_of(&Patch::default()).unwrap();
        assert!(fields.is_empty());

        let fields = fields_of(&Patch { name: Some("x".into()), email: None }).unwrap();
        assert_eq!(Value::Object(fields), json!({ "name": "x" }));
    }

    #[test]
    fn explicit_null_survives_a_round_trip_through_json() {
        let patch: Patch = serde_json::from_value(json!({ "email": null })).unwrap();
        assert_eq!(patch.email, Some(None));
        assert_eq!(Value::Object(fields_of(&patch).unwrap()), json!({ "email": null }));

        let patch: Patch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(patch.email, None);
    }

    #[test]
    fn non_struct_schema_is_rejected() {
        assert!(matches!(fields_of(&42), Err(DbError::NotAnObject(_))));
    }

    #[test]
    fn identifiers_are_validated() {
        assert_eq!(quote_ident("full_name").unwrap(), "\"full_name\"");
        for bad in ["", "1st", "name; DROP TABLE users", "a\"b", "na me"] {
            assert!(quote_ident(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
