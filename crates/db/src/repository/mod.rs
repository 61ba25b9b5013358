//! Generic repository — create / read / update / delete for one model.
//!
//! A [`Repository`] is request-scoped: it owns the request's [`DbSession`]
//! and the acting username, and is dropped with the request. It never caches
//! rows between calls. Every write runs in its own transaction that either
//! commits or rolls back; no partial mutation is observable.
//!
//! Failure policy per operation:
//! - `create` swallows persistence errors into `None` (logged only).
//! - `read_by_id` and `delete` report absence as `Ok(None)`.
//! - `read_optional` returns an empty list when nothing matches.
//! - `update` fails with [`CrudError::Update`] on absence or commit failure.

mod sql;

use std::marker::PhantomData;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::schema::{fields_of, Model};
use crate::{CrudError, DbError, DbSession};

/// CRUD over model `M` with create schema `C`, update schema `U` and query
/// schema `Q`.
pub struct Repository<M, C, U, Q> {
    session: DbSession,
    username: String,
    _schemas: PhantomData<fn() -> (M, C, U, Q)>,
}

impl<M, C, U, Q> Repository<M, C, U, Q>
where
    M: Model,
    C: Serialize,
    U: Serialize,
    Q: Serialize,
{
    /// Bind a repository to a checked-out session and the authenticated
    /// username. The username is kept for error attribution only.
    pub fn new(session: DbSession, username: impl Into<String>) -> Self {
        Self {
            session,
            username: username.into(),
            _schemas: PhantomData,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Insert a row built from every field of `obj` and return it as stored.
    ///
    /// Any failure rolls the transaction back and yields `None`.
    pub async fn create(&mut self, obj: &C) -> Option<M> {
        let result = match fields_of(obj) {
            Ok(fields) => sql::insert::<M>(&mut self.session, fields).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(created) => {
                info!(table = M::TABLE, id = created.id(), username = %self.username, "Created new entity: {created:?}");
                Some(created)
            }
            Err(err) => {
                error!(table = M::TABLE, username = %self.username, error = %err, "Error while inserting new object into database");
                None
            }
        }
    }

    /// Point lookup by primary key.
    pub async fn read_by_id(&mut self, id: i64) -> Result<Option<M>, CrudError> {
        sql::fetch_by_id::<M>(&mut self.session, id)
            .await
            .map_err(|err| self.storage_error(err))
    }

    /// Rows matching every field explicitly set in `query`, ascending by id.
    ///
    /// An empty result is a normal outcome; the not-found diagnostic is
    /// logged, not returned.
    pub async fn read_optional(&mut self, query: &Q) -> Result<Vec<M>, CrudError> {
        let filters = fields_of(query).map_err(|err| self.storage_error(err))?;
        let rows = sql::fetch_filtered::<M>(&mut self.session, filters)
            .await
            .map_err(|err| self.storage_error(err))?;

        if rows.is_empty() {
            let diagnostic = CrudError::Select {
                username: self.username.clone(),
                reference: M::TABLE.to_string(),
            };
            warn!(table = M::TABLE, username = %self.username, "{diagnostic}");
        }

        Ok(rows)
    }

    /// Delete by primary key, returning the removed row.
    pub async fn delete(&mut self, id: i64) -> Result<Option<M>, CrudError> {
        match sql::delete_by_id::<M>(&mut self.session, id).await {
            Ok(Some(deleted)) => {
                info!(table = M::TABLE, id, username = %self.username, "Entity {deleted:?} successfully deleted from database");
                Ok(Some(deleted))
            }
            Ok(None) => {
                error!(table = M::TABLE, id, username = %self.username, "Object with id = {id} not found in query");
                Ok(None)
            }
            Err(cause) => Err(self.delete_error(id, Some(cause))),
        }
    }

    /// Apply every field present in `patch` to the row with `id`.
    ///
    /// # Errors
    /// [`CrudError::Update`] tagged with `id` when the row is absent, or with
    /// the underlying cause when the transaction failed and was rolled back.
    pub async fn update(&mut self, id: i64, patch: &U) -> Result<M, CrudError> {
        let patch = fields_of(patch).map_err(|cause| self.update_error(id, Some(cause)))?;

        match sql::update_by_id::<M>(&mut self.session, id, patch).await {
            Ok(Some(updated)) => {
                info!(table = M::TABLE, id, username = %self.username, "Updated entity: {updated:?}");
                Ok(updated)
            }
            Ok(None) => Err(self.update_error(id, None)),
            Err(cause) => Err(self.update_error(id, Some(cause))),
        }
    }

    /// The error a caller raises when [`Repository::create`] yielded `None`.
    pub fn create_error(&self) -> CrudError {
        CrudError::Create {
            username: self.username.clone(),
        }
    }

    /// The error a caller raises when a point lookup came back empty.
    pub fn select_error(&self, id: i64) -> CrudError {
        error!(table = M::TABLE, id, username = %self.username, "Error find object {id}");
        CrudError::Select {
            username: self.username.clone(),
            reference: id.to_string(),
        }
    }

    /// The error a caller raises when [`Repository::delete`] found nothing.
    pub fn delete_error(&self, id: i64, cause: Option<DbError>) -> CrudError {
        match &cause {
            Some(err) => error!(table = M::TABLE, id, username = %self.username, error = %err, "Error delete object {id}"),
            None => error!(table = M::TABLE, id, username = %self.username, "Error delete object {id}"),
        }
        CrudError::Delete {
            username: self.username.clone(),
            id,
            cause,
        }
    }

    fn update_error(&self, id: i64, cause: Option<DbError>) -> CrudError {
        match &cause {
            Some(err) => error!(table = M::TABLE, id, username = %self.username, error = %err, "Error updating object {id}"),
            None => error!(table = M::TABLE, id, username = %self.username, "Error updating object {id}: not found"),
        }
        CrudError::Update {
            username: self.username.clone(),
            id,
            cause,
        }
    }

    fn storage_error(&self, source: DbError) -> CrudError {
        error!(table = M::TABLE, username = %self.username, error = %source, "Database read failed");
        CrudError::Storage {
            username: self.username.clone(),
            source,
        }
    }
}
