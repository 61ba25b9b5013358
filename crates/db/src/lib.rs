//! `db` crate — persistence layer.
//!
//! Provides the SQLite pool and per-request sessions, the model/schema
//! capabilities, one generic [`Repository`] implementing create / read /
//! update / delete for any model, and the [`CrudError`] taxonomy those
//! operations fail with. No business logic lives here.

pub mod error;
pub mod pool;
pub mod repository;
pub mod schema;
pub mod models;

pub use pool::{DbPool, DbSession};
pub use error::{CrudError, DbError};
pub use repository::Repository;
pub use schema::Model;

#[cfg(test)]
mod repository_tests;
