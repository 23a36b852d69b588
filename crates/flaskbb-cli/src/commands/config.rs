//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use tracing::warn;

use crate::output::{self, OutputFormat};
use flaskbb_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration file
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => {
            let config = super::load_config(config_path)?;
            if let Err(e) = config.validate() {
                warn!(path = %config_path, error = %e, "Configuration rejected");
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
            output::print_success(&format!("Configuration '{}' is valid", config_path));
            output::print_kv("Project", &config.plugins.project_name);
            output::print_kv("Entry-point group", &config.plugins.entry_point_group);
            output::print_kv("Plugin directory", &config.plugins.directory);
            output::print_kv("Disabled", &config.plugins.disabled.join(", "));
            output::print_kv("Log level", &config.logging.level);
        }
    }

    Ok(())
}
