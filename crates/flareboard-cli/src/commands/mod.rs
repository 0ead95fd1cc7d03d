//! CLI command definitions and dispatch.

pub mod migrate;
pub mod notify;
pub mod token;
pub mod watch;

use clap::{Parser, Subcommand};

use flareboard_client::{ClientConfig, ClientError};
use flareboard_core::config::AppConfig;
use flareboard_core::error::AppError;

use crate::output::OutputFormat;

/// FlareBoard: notifications and live board updates
#[derive(Debug, Parser)]
#[command(name = "flareboard", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to load
    #[arg(long, default_value = "development")]
    pub env: String,

    /// Server base URL for remote commands
    #[arg(short, long, default_value = "http://localhost:8080")]
    pub server: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Issue an access token for local testing
    Token(token::TokenArgs),
    /// Manage notifications over the REST surface
    Notify(notify::NotifyArgs),
    /// Stream live events for a user
    Watch(watch::WatchArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&self.load_config()?).await,
            Commands::Token(args) => token::execute(args, &self.load_config()?),
            Commands::Notify(args) => notify::execute(args, &self.client_config(), self.format).await,
            Commands::Watch(args) => watch::execute(args, self.client_config(), self.format).await,
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config_dir, &self.env)
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.server.clone())
    }
}

/// Map a client failure onto the shared error type.
pub fn client_error(err: ClientError) -> AppError {
    match err {
        ClientError::Api { status: 401, message, .. } | ClientError::Rejected(message) => {
            AppError::authentication(message)
        }
        ClientError::Api { status: 403, message, .. } => AppError::authorization(message),
        ClientError::Api { status: 404, message, .. } => AppError::not_found(message),
        ClientError::Api { status: 400, message, .. } => AppError::validation(message),
        ClientError::Http(e) => AppError::service_unavailable(format!("Server unreachable: {e}")),
        other => AppError::internal(other.to_string()),
    }
}
