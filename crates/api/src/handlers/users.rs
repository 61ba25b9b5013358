use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};

use db::models::{User, UserCreate, UserQuery, UserRepository, UserUpdate};

use crate::{deps::Repo, ApiError};

pub async fn create(
    Repo(mut repo): Repo<UserRepository>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    match repo.create(&payload).await {
        Some(user) => Ok((StatusCode::CREATED, Json(user))),
        None => Err(repo.create_error().into()),
    }
}

pub async fn get(
    Path(id): Path<i64>,
    Repo(mut repo): Repo<UserRepository>,
) -> Result<Json<User>, ApiError> {
    match repo.read_by_id(id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(repo.select_error(id).into()),
    }
}

/// `GET /users`. Only string equality can be expressed in the query
/// string; see the crate docs for NULL filters.
pub async fn list(
    Repo(mut repo): Repo<UserRepository>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = repo.read_optional(&query).await?;
    Ok(Json(users))
}

pub async fn update(
    Path(id): Path<i64>,
    Repo(mut repo): Repo<UserRepository>,
    Json(patch): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    let user = repo.update(id, &patch).await?;
    Ok(Json(user))
}

pub async fn delete(
    Path(id): Path<i64>,
    Repo(mut repo): Repo<UserRepository>,
) -> Result<Json<User>, ApiError> {
    match repo.delete(id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(repo.delete_error(id, None).into()),
    }
}
