//! `api` crate — HTTP REST API layer.
//!
//! Exposes (all under `/api/v1`, bearer-authenticated):
//!   POST   /users
//!   GET    /users?name=&email=
//!   GET    /users/{id}
//!   PATCH  /users/{id}
//!   DELETE /users/{id}
//!
//! plus the public `GET /api/health`.
//!
//! Query-string filters are plain equality: `?email=` matches the empty
//! string, never NULL. A query string cannot carry an explicit null, so
//! filtering on NULL is only available through `UserQuery` directly.

pub mod deps;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub use error::ApiError;
pub use state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/users", get(handlers::users::list).post(handlers::users::create))
        .route(
            "/users/{id}",
            get(handlers::users::get)
                .patch(handlers::users::update)
                .delete(handlers::users::delete),
        );

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/api/v1", v1)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `bind` and serve until the process is stopped.
pub async fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
