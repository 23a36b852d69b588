//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Project tag hook specifications must carry to be accepted.
    #[serde(default = "default_project_name")]
    pub project_name: String,
    /// Entry-point group plugins are discovered under.
    #[serde(default = "default_entry_point_group")]
    pub entry_point_group: String,
    /// Directory scanned for `*.dist-info` plugin distributions.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// Whether to load discovered plugins on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// Plugin names parked by the administrator; blocked before loading.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            entry_point_group: default_entry_point_group(),
            directory: default_plugin_directory(),
            auto_load: true,
            disabled: Vec::new(),
        }
    }
}

fn default_project_name() -> String {
    "flaskbb".to_string()
}

fn default_entry_point_group() -> String {
    "flaskbb_plugins".to_string()
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

fn default_true() -> bool {
    true
}
