//! FlaskBB host: loads configuration, initialises logging and boots the
//! plugin system.

use tracing_subscriber::{EnvFilter, fmt};

use flaskbb::create_app;
use flaskbb_core::config::AppConfig;
use flaskbb_core::error::AppError;
use flaskbb_plugin::PluginManagerApi;

fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config) {
        tracing::error!(error = %e, "Startup failed");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("FLASKBB_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("FLASKBB_ENV").unwrap_or_else(|_| "development".to_string());
    let env_config_path = format!("config/{}.toml", env);

    let config = AppConfig::load_layered(&[config_path.as_str(), env_config_path.as_str()])?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        plugin_dir = %config.plugins.directory,
        "Starting FlaskBB"
    );

    let app = create_app(config)?;

    for (name, plugin) in app.pluggy.list_name_plugin() {
        let meta = app.pluggy.get_metadata(&name);
        tracing::info!(
            plugin = %name,
            package = plugin.package().unwrap_or_default(),
            version = meta.map(|m| m.version.as_str()).unwrap_or_default(),
            "Plugin enabled"
        );
    }
    for (name, dist) in app.pluggy.list_disabled_plugins() {
        tracing::info!(plugin = %name, package = dist.project_name(), "Plugin disabled");
    }

    tracing::info!(
        blueprints = app.blueprints.len(),
        translations = app.translations.len(),
        summary = %app.plugin_summary(),
        "FlaskBB ready"
    );
    Ok(())
}
