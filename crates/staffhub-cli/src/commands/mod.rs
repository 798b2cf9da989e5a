//! CLI command definitions and dispatch.

pub mod broadcast;
pub mod listen;
pub mod token;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use staffhub_core::config::AppConfig;
use staffhub_core::error::AppError;

/// StaffHub: real-time notification tools
#[derive(Debug, Parser)]
#[command(name = "staffhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Configuration environment overlay (config/{env}.toml)
    #[arg(long, env = "STAFFHUB_ENV", default_value = "development")]
    pub env: String,

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
    /// Open the notification stream and print notifications as they arrive
    Listen(listen::ListenArgs),
    /// Dispatch a notification through the server
    Broadcast(broadcast::BroadcastArgs),
    /// Mint an access token signed with the configured secret
    Token(token::TokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(&self.config, &self.env)?;
        match &self.command {
            Commands::Listen(args) => listen::execute(args, &config, self.format).await,
            Commands::Broadcast(args) => broadcast::execute(args, &config, self.format).await,
            Commands::Token(args) => token::execute(args, &config, self.format),
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str, env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path, env)
}
