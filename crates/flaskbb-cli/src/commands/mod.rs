//! CLI command definitions and dispatch.

pub mod config;
pub mod plugins;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::output::OutputFormat;
use flaskbb_core::config::AppConfig;
use flaskbb_core::error::AppError;

/// FlaskBB: plugin administration
#[derive(Debug, Parser)]
#[command(name = "flaskbb", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

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
    /// Plugin inspection
    Plugins(plugins::PluginsArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Plugins(args) => plugins::execute(args, &self.config, self.format),
            Commands::Config(args) => config::execute(args, &self.config, self.format),
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    debug!(path = %config_path, "Loading configuration");
    AppConfig::load(config_path)
}
