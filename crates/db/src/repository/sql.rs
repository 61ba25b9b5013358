//! Statement builders and single-transaction helpers.
//!
//! Column names come from schema fields and are validated before they are
//! spliced in; every value is a bound parameter.

use serde_json::{Map, Value};
use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection, Transaction};
use tracing::warn;

use crate::schema::{quote_ident, Model};
use crate::DbError;

/// Bind a JSON scalar with the closest SQLite type. Arrays and objects are
/// stored as their JSON text.
fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: Value) {
    match value {
        Value::Null => qb.push_bind(None::<String>),
        Value::Bool(b) => qb.push_bind(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => qb.push_bind(i),
            None => qb.push_bind(n.as_f64()),
        },
        Value::String(s) => qb.push_bind(s),
        other => qb.push_bind(other.to_string()),
    };
}

/// Roll back after a failed statement and hand back the statement's error.
/// A failing rollback is logged; the transaction is discarded either way.
async fn abort(tx: Transaction<'_, Sqlite>, err: sqlx::Error) -> DbError {
    if let Err(rollback) = tx.rollback().await {
        warn!(error = %rollback, "Rollback failed after statement error");
    }
    err.into()
}

pub(crate) async fn fetch_by_id<M: Model>(conn: &mut SqliteConnection, id: i64) -> Result<Option<M>, DbError> {
    let sql = format!("SELECT * FROM {} WHERE id = ?", quote_ident(M::TABLE)?);
    let row = sqlx::query_as::<_, M>(&sql).bind(id).fetch_optional(conn).await?;
    Ok(row)
}

/// `SELECT *` filtered by equality on every entry of `filters`, ordered by id.
pub(crate) async fn fetch_filtered<M: Model>(
    conn: &mut SqliteConnection,
    filters: Map<String, Value>,
) -> Result<Vec<M>, DbError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {}", quote_ident(M::TABLE)?));

    for (i, (column, value)) in filters.into_iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(quote_ident(&column)?);
        if value.is_null() {
            qb.push(" IS NULL");
        } else {
            qb.push(" = ");
            push_value(&mut qb, value);
        }
    }
    qb.push(" ORDER BY id ASC");

    let rows = qb.build_query_as::<M>().fetch_all(conn).await?;
    Ok(rows)
}

/// Insert one row and return it as stored, generated columns included.
pub(crate) async fn insert<M: Model>(conn: &mut SqliteConnection, fields: Map<String, Value>) -> Result<M, DbError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("INSERT INTO {}", quote_ident(M::TABLE)?));

    if fields.is_empty() {
        qb.push(" DEFAULT VALUES");
    } else {
        let (columns, values): (Vec<String>, Vec<Value>) = fields.into_iter().unzip();
        qb.push(" (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(quote_ident(column)?);
        }
        qb.push(") VALUES (");
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, value);
        }
        qb.push(")");
    }
    qb.push(" RETURNING *");

    let mut tx = conn.begin().await?;
    match qb.build_query_as::<M>().fetch_one(&mut *tx).await {
        Ok(row) => {
            tx.commit().await?;
            Ok(row)
        }
        Err(err) => Err(abort(tx, err).await),
    }
}

/// Apply `patch` to the row with `id` inside one transaction.
///
/// `Ok(None)` means the row does not exist; nothing was written.
pub(crate) async fn update_by_id<M: Model>(
    conn: &mut SqliteConnection,
    id: i64,
    patch: Map<String, Value>,
) -> Result<Option<M>, DbError> {
    let mut tx = conn.begin().await?;

    let Some(existing) = fetch_by_id::<M>(&mut *tx, id).await? else {
        tx.rollback().await?;
        return Ok(None);
    };
    if patch.is_empty() {
        tx.rollback().await?;
        return Ok(Some(existing));
    }

    let mut qb = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", quote_ident(M::TABLE)?));
    for (i, (column, value)) in patch.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(quote_ident(&column)?);
        qb.push(" = ");
        push_value(&mut qb, value);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING *");

    match qb.build_query_as::<M>().fetch_one(&mut *tx).await {
        Ok(row) => {
            tx.commit().await?;
            Ok(Some(row))
        }
        Err(err) => Err(abort(tx, err).await),
    }
}

/// Delete the row with `id` inside one transaction and return it detached.
pub(crate) async fn delete_by_id<M: Model>(conn: &mut SqliteConnection, id: i64) -> Result<Option<M>, DbError> {
    let mut tx = conn.begin().await?;

    let Some(existing) = fetch_by_id::<M>(&mut *tx, id).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    let sql = format!("DELETE FROM {} WHERE id = ?", quote_ident(M::TABLE)?);
    if let Err(err) = sqlx::query(&sql).bind(id).execute(&mut *tx).await {
        return Err(abort(tx, err).await);
    }
    tx.commit().await?;

    Ok(Some(existing))
}
