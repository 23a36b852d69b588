//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod plugin;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::logging::LoggingConfig;
pub use self::plugin::PluginConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Plugin system settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; values missing from it fall back to defaults.
    /// Environment variables prefixed with `FLASKBB` (nested keys separated
    /// by `__`, e.g. `FLASKBB__PLUGINS__DIRECTORY`) override the file.
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::load_layered(&[path])
    }

    /// Load configuration from several optional TOML files, later files
    /// overriding earlier ones, then the environment.
    pub fn load_layered(paths: &[&str]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for path in paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("FLASKBB")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("plugins.disabled")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        debug!(files = ?paths, "Configuration loaded");
        Ok(app_config)
    }

    /// Check values the type system cannot.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.plugins.project_name.trim().is_empty() {
            return Err(AppError::validation("plugins.project_name must not be empty"));
        }
        if self.plugins.entry_point_group.trim().is_empty() {
            return Err(AppError::validation(
                "plugins.entry_point_group must not be empty",
            ));
        }
        if let Some(name) = self.plugins.disabled.iter().find(|n| n.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "plugins.disabled contains an empty name: {name:?}"
            )));
        }
        self.logging.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = AppConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.plugins.project_name, "flaskbb");
        assert_eq!(config.plugins.entry_point_group, "flaskbb_plugins");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forum.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[plugins]\ndirectory = \"/srv/plugins\"\ndisabled = [\"portal\"]\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = AppConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.plugins.directory, "/srv/plugins");
        assert_eq!(config.plugins.disabled, vec!["portal".to_string()]);
        assert!(config.plugins.auto_load);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_later_layer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("default.toml");
        let overlay = dir.path().join("production.toml");
        std::fs::write(&base, "[logging]\nlevel = \"debug\"\nformat = \"json\"\n").unwrap();
        std::fs::write(&overlay, "[logging]\nlevel = \"warn\"\n").unwrap();

        let config =
            AppConfig::load_layered(&[base.to_str().unwrap(), overlay.to_str().unwrap()]).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.plugins.entry_point_group = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Validation);
    }
}
