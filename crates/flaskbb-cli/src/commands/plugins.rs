//! Plugin inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, info};

use flaskbb::FlaskBB;
use flaskbb_core::error::AppError;
use flaskbb_plugin::PluginManagerApi;

use crate::output::{self, OutputFormat};

/// Arguments for plugin commands
#[derive(Debug, Args)]
pub struct PluginsArgs {
    /// Plugins subcommand
    #[command(subcommand)]
    pub command: PluginsCommand,
}

/// Plugins subcommands
#[derive(Debug, Subcommand)]
pub enum PluginsCommand {
    /// List enabled and disabled plugins
    List {
        /// Include the forum's own modules
        #[arg(long)]
        internal: bool,
    },
    /// Show the distribution metadata of a plugin
    Info {
        /// Plugin name
        name: String,
    },
    /// List hook specifications and the plugins implementing them
    Hooks,
}

/// Row of `plugins list`
#[derive(Debug, Serialize, Tabled)]
pub struct PluginRow {
    /// Canonical name
    #[tabled(rename = "Name")]
    pub name: String,
    /// `external`, `internal` or `disabled`
    #[tabled(rename = "Status")]
    pub status: String,
    /// Distribution name
    #[tabled(rename = "Package")]
    pub package: String,
    /// Distribution version
    #[tabled(rename = "Version")]
    pub version: String,
}

/// Row of `plugins hooks`
#[derive(Debug, Serialize, Tabled)]
pub struct HookRow {
    /// Hook name
    #[tabled(rename = "Hook")]
    pub hook: String,
    /// Parameters handlers may accept
    #[tabled(rename = "Arguments")]
    pub arguments: String,
    /// Implementing plugins in call order
    #[tabled(rename = "Implementations")]
    pub implementations: String,
}

/// Execute plugin commands
pub fn execute(args: &PluginsArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    debug!(directory = %config.plugins.directory, "Booting forum to inspect plugins");
    let app = flaskbb::create_app(config)?;
    info!(
        external = app.pluggy.list_name().len(),
        disabled = app.pluggy.list_disabled_plugins().len(),
        "Plugins loaded"
    );

    match &args.command {
        PluginsCommand::List { internal } => {
            output::print_list(&plugin_rows(&app, *internal), format);
        }
        PluginsCommand::Info { name } => {
            let meta = app.pluggy.get_metadata(name).ok_or_else(|| {
                AppError::not_found(format!("No distribution metadata for plugin '{}'", name))
            })?;
            output::print_item(meta, format);
        }
        PluginsCommand::Hooks => {
            output::print_list(&hook_rows(&app)?, format);
        }
    }

    Ok(())
}

fn plugin_rows(app: &FlaskBB, include_internal: bool) -> Vec<PluginRow> {
    let pluggy = &app.pluggy;
    let row = |name: String, status: &str| {
        let meta = pluggy.get_metadata(&name);
        PluginRow {
            package: meta.map(|m| m.package_name.clone()).unwrap_or_default(),
            version: meta.map(|m| m.version.clone()).unwrap_or_default(),
            status: status.to_string(),
            name,
        }
    };

    let mut rows: Vec<PluginRow> = pluggy
        .list_name()
        .into_iter()
        .map(|name| row(name, "external"))
        .collect();
    if include_internal {
        rows.extend(
            pluggy
                .list_internal_name_plugin()
                .into_iter()
                .map(|(name, _)| row(name, "internal")),
        );
    }
    rows.extend(
        pluggy
            .list_disabled_plugins()
            .into_iter()
            .map(|(name, _)| row(name, "disabled")),
    );
    rows
}

fn hook_rows(app: &FlaskBB) -> Result<Vec<HookRow>, AppError> {
    app.pluggy
        .hookspecs()
        .into_iter()
        .map(|spec| {
            let caller = app.pluggy.hook(&spec.name)?;
            Ok(HookRow {
                hook: caller.name().to_string(),
                arguments: caller
                    .spec()
                    .map(|s| s.argnames.join(", "))
                    .unwrap_or_default(),
                implementations: caller.impl_names().join(", "),
            })
        })
        .collect()
}
