//! `crud-api` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`  — start the API server.
//! - `token`  — issue a bearer token for a username.
//! - `tables` — list the tables reflected from the database.

mod settings;

use anyhow::{Context, Result};
use auth::{TokenResponse, TokenService};
use clap::{Parser, Subcommand};
use db::Model;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use settings::{AuthSettings, DatabaseSettings, SERVICE_NAME};

#[derive(Parser)]
#[command(
    name = "crud-api",
    about = "Token-authenticated CRUD service over an existing database",
    version
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8080")]
        bind: String,

        #[command(flatten)]
        database: DatabaseSettings,

        #[command(flatten)]
        auth: AuthSettings,
    },
    /// Issue a bearer token and print it as JSON.
    Token {
        /// Username to put in the `sub` claim.
        #[arg(long)]
        sub: String,

        /// Token lifetime; defaults to the configured `--token-expire`.
        #[arg(long)]
        ttl_minutes: Option<i64>,

        #[command(flatten)]
        auth: AuthSettings,
    },
    /// List the tables reflected from the database.
    Tables {
        #[command(flatten)]
        database: DatabaseSettings,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Command::Serve { bind, database, auth } => {
            info!("Starting {SERVICE_NAME} on {bind}");
            let pool = db::pool::create_pool(&database.database_url, database.max_connections)
                .await
                .context("failed to connect to database")?;
            db::pool::ensure_tables(&pool, &[db::models::User::TABLE])
                .await
                .context("database schema check failed")?;
            let tokens = TokenService::new(&auth.token_config())?;

            api::serve(&bind, api::AppState::new(pool, tokens)).await?;
        }
        Command::Token { sub, ttl_minutes, auth } => {
            let tokens = TokenService::new(&auth.token_config())?;
            let ttl = auth.token_ttl(ttl_minutes)?;
            let token = tokens.issue_for(&sub, Some(ttl))?;
            println!("{}", serde_json::to_string(&TokenResponse::bearer(token))?);
        }
        Command::Tables { database } => {
            let pool = db::pool::create_pool(&database.database_url, 1)
                .await
                .context("failed to connect to database")?;
            for table in db::pool::reflect_tables(&pool).await? {
                println!("{table}");
            }
        }
    }

    Ok(())
}
