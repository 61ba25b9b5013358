//! Process configuration.
//!
//! Parsed once at startup from flags and environment variables, then passed
//! by value into the components that need it. Nothing re-reads the
//! environment after this point.

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Args;

use auth::TokenConfig;

/// Service name used in the startup log line.
pub const SERVICE_NAME: &str = "crud-api";

#[derive(Debug, Clone, Args)]
pub struct DatabaseSettings {
    /// SQLite connection URL of the existing database.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://db.db")]
    pub database_url: String,

    /// Connection pool ceiling.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Args)]
pub struct AuthSettings {
    /// Shared HMAC secret used to sign bearer tokens.
    #[arg(long, env = "SECRET_KEY", default_value = "secret", hide_env_values = true)]
    pub secret_key: String,

    /// Token signing algorithm (HS256, HS384 or HS512).
    #[arg(long, env = "ALGORITHM", default_value = "HS256")]
    pub algorithm: String,

    /// Lifetime in minutes of tokens issued by the `token` command.
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = 30)]
    pub token_expire: i64,
}

impl AuthSettings {
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            secret_key: self.secret_key.clone(),
            algorithm: self.algorithm.clone(),
        }
    }

    /// Lifetime for an issued token: `minutes` if given, else `token_expire`.
    pub fn token_ttl(&self, minutes: Option<i64>) -> Result<Duration> {
        let minutes = minutes.unwrap_or(self.token_expire);
        Duration::try_minutes(minutes).with_context(|| format!("token ttl of {minutes} minutes is out of range"))
    }
}
