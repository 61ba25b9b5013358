//! SQLite connection pool, per-request sessions and schema reflection.
//!
//! The schema belongs to the database, not to this crate: tables are
//! reflected at startup and never created or migrated from here.

use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};
use tracing::info;

use crate::DbError;

/// Type alias for the shared pool used across the whole application.
pub type DbPool = SqlitePool;

/// One checked-out connection, owned by a single request.
pub type DbSession = PoolConnection<Sqlite>;

/// Create a new connection pool from the given `database_url`.
///
/// `max_connections` controls the pool ceiling.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, DbError> {
    info!("Connecting to database (max_connections={})", max_connections);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Names of the user tables present in the database, sorted.
pub async fn reflect_tables(pool: &DbPool) -> Result<Vec<String>, DbError> {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    info!(count = tables.len(), "Reflected database schema");
    Ok(tables)
}

/// Fail with [`DbError::MissingTable`] unless every table in `required`
/// exists.
pub async fn ensure_tables(pool: &DbPool, required: &[&str]) -> Result<(), DbError> {
    let tables = reflect_tables(pool).await?;
    for table in required {
        if !tables.iter().any(|t| t == table) {
            return Err(DbError::MissingTable(table.to_string()));
        }
    }
    Ok(())
}
