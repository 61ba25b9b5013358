//! Mapping of auth and repository failures onto HTTP responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use auth::AuthError;
use db::{CrudError, DbError};

/// Header carrying the acting username on repository failures.
pub const USERNAME_ERROR_HEADER: &str = "x-username-error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Crud(#[from] CrudError),

    /// No session could be checked out for the request.
    #[error("database unavailable: {0}")]
    Unavailable(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(AuthError::ExpiredCredential) => detail(StatusCode::UNAUTHORIZED, "Token expired"),
            ApiError::Auth(AuthError::InvalidCredential) => {
                let mut response = detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Auth(err) => {
                error!("Auth error: {}", err);
                detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            ApiError::Crud(err) => {
                let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let mut response = detail(status, &err.to_string());
                match HeaderValue::from_str(err.username()) {
                    Ok(value) => {
                        response.headers_mut().insert(USERNAME_ERROR_HEADER, value);
                    }
                    Err(_) => warn!(username = err.username(), "username is not a valid header value"),
                }
                response
            }
            ApiError::Unavailable(err) => {
                error!("Session checkout failed: {}", err);
                detail(StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
            }
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}
