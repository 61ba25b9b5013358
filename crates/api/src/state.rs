//! Shared application state.

use std::sync::Arc;

use auth::TokenService;
use db::DbPool;

/// Process-wide state handed to every request. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: DbPool, tokens: TokenService) -> Self {
        Self {
            pool,
            tokens: Arc::new(tokens),
        }
    }
}
