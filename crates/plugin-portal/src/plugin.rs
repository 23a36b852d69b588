//! Portal plugin object and its registration entry point.

use serde::{Deserialize, Serialize};

use flaskbb_plugin::hooks::HookImpl;
use flaskbb_plugin::plugin::{Plugin, PluginHandle};

use crate::hooks;

/// Entry-point name the portal is advertised under.
pub const ENTRY_POINT: &str = "portal";

/// Entry-point value in the distribution's `entry_points.txt`.
pub const ENTRY_POINT_VALUE: &str = "flaskbb_plugin_portal";

/// Distribution name.
pub const PACKAGE: &str = "flaskbb-plugin-portal";

/// Portal page options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    /// Forums whose topics appear on the portal.
    pub forum_ids: Vec<u64>,
    /// Number of recent topics shown.
    pub recent_topics: usize,
    /// URL prefix of the portal blueprint.
    pub url_prefix: String,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            forum_ids: vec![1],
            recent_topics: 10,
            url_prefix: "/portal".to_string(),
        }
    }
}

/// The portal plugin.
#[derive(Debug, Clone, Default)]
pub struct PortalPlugin {
    settings: PortalSettings,
}

impl PortalPlugin {
    /// Creates the plugin with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the plugin with explicit settings.
    pub fn with_settings(settings: PortalSettings) -> Self {
        Self { settings }
    }

    /// Current settings.
    pub fn settings(&self) -> &PortalSettings {
        &self.settings
    }
}

impl Plugin for PortalPlugin {
    fn canonical_name(&self) -> Option<String> {
        Some(ENTRY_POINT.to_string())
    }

    fn hookimpls(&self) -> Vec<HookImpl> {
        vec![
            hooks::load_blueprints(&self.settings),
            hooks::load_translations(),
            hooks::tpl_before_navigation(&self.settings),
        ]
    }

    fn package(&self) -> Option<&str> {
        Some(PACKAGE)
    }
}

/// Constructor used by the host's factory resolver.
pub fn factory() -> PluginHandle {
    PluginHandle::new(PortalPlugin::new())
}
