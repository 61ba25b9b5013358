//! Request-scoped dependencies.
//!
//! [`CurrentUser`] validates the caller's bearer token; [`Repo`] checks out a
//! database session and binds a repository to it together with the
//! authenticated username. Handlers simply take `Repo<UserRepository>`.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;

use auth::{AuthError, Principal};
use db::{DbError, DbSession, Model, Repository};

use crate::{ApiError, AppState};

/// Raw token header accepted when no `Authorization` header is sent.
pub const TOKEN_HEADER: &str = "token";

/// The authenticated principal of the request. Rejects with 401.
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts).ok_or(AuthError::InvalidCredential)?;
        let principal = state.tokens.validate(token)?;
        Ok(CurrentUser(principal))
    }
}

/// `Authorization: Bearer <t>` first, then the raw `token` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    if let Some(value) = parts.headers.get(AUTHORIZATION) {
        return value.to_str().ok()?.strip_prefix("Bearer ");
    }
    parts.headers.get(TOKEN_HEADER)?.to_str().ok()
}

/// Types that can be constructed from a session and a principal.
pub trait BindRepository: Sized {
    fn bind(session: DbSession, principal: Principal) -> Self;
}

impl<M, C, U, Q> BindRepository for Repository<M, C, U, Q>
where
    M: Model,
    C: Serialize,
    U: Serialize,
    Q: Serialize,
{
    fn bind(session: DbSession, principal: Principal) -> Self {
        Repository::new(session, principal.into_username())
    }
}

/// A repository bound to this request's session and principal.
pub struct Repo<R>(pub R);

impl<S, R> FromRequestParts<S> for Repo<R>
where
    AppState: FromRef<S>,
    S: Send + Sync,
    R: BindRepository + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state).await?;
        let state = AppState::from_ref(state);
        let session = state.pool.acquire().await.map_err(DbError::from)?;
        Ok(Repo(R::bind(session, principal)))
    }
}
