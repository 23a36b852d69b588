//! Forum application boot: plugin loading and setup hooks.

use serde_json::{Value, json};
use tracing::{info, warn};

use flaskbb_core::config::AppConfig;
use flaskbb_core::error::AppError;
use flaskbb_core::result::AppResult;
use flaskbb_plugin::prelude::*;
use flaskbb_plugin::DistInfoDirectory;

use crate::internal;

/// Hooks fired once plugins are loaded, in order.
const SETUP_HOOKS: [&str; 3] = [
    "flaskbb_load_blueprints",
    "flaskbb_jinja_directives",
    "flaskbb_request_processors",
];

/// The running forum as far as plugins are concerned.
#[derive(Debug)]
pub struct FlaskBB {
    /// Effective configuration.
    pub config: AppConfig,
    /// Plugin manager.
    pub pluggy: PluginManager,
    /// Extension descriptors returned by `flaskbb_extensions`.
    pub extensions: Vec<Value>,
    /// Blueprint descriptors returned by `flaskbb_load_blueprints`.
    pub blueprints: Vec<Value>,
    /// Translation folders returned by `flaskbb_load_translations`.
    pub translations: Vec<Value>,
}

/// Compiled-in plugin packages an entry point may name.
pub fn plugin_resolver() -> FactoryResolver {
    FactoryResolver::new().with(plugin_portal::ENTRY_POINT_VALUE, plugin_portal::factory)
}

/// Builds the plugin manager the forum runs with: specs added, discovery
/// pointed at the configured plugin directory.
pub fn plugin_manager(config: &AppConfig) -> AppResult<PluginManager> {
    let mut pluggy = PluginManager::with_discovery(
        &config.plugins.project_name,
        Discovery::new(
            DistInfoDirectory::new(&config.plugins.directory),
            plugin_resolver(),
        ),
    );
    pluggy.add_hookspecs(&FlaskBBSpecs)?;
    Ok(pluggy)
}

/// Creates the application and loads its plugins.
pub fn create_app(config: AppConfig) -> AppResult<FlaskBB> {
    let pluggy = plugin_manager(&config)?;
    let mut app = FlaskBB {
        config,
        pluggy,
        extensions: Vec::new(),
        blueprints: Vec::new(),
        translations: Vec::new(),
    };
    app.load_plugins()?;
    app.configure()?;
    Ok(app)
}

impl FlaskBB {
    /// JSON view of the application passed to hooks as `app`.
    pub fn describe(&self) -> Value {
        json!({
            "name": self.config.plugins.project_name,
            "version": env!("CARGO_PKG_VERSION"),
            "config": self.config,
        })
    }

    /// Registers internal modules, blocks disabled plugins, runs discovery
    /// and fires `flaskbb_extensions`.
    pub fn load_plugins(&mut self) -> AppResult<()> {
        for module in internal::modules() {
            self.pluggy.register_internal(PluginHandle::new(module), None)?;
        }

        for name in &self.config.plugins.disabled {
            self.pluggy.set_blocked(name);
        }

        if self.config.plugins.auto_load {
            let group = self.config.plugins.entry_point_group.clone();
            let loaded = self.pluggy.load_setuptools_entrypoints(&group, None);
            info!(group = %group, loaded, "Plugins discovered");
        }

        let args = hook_args!("app" => self.describe());
        self.extensions = self.pluggy.invoke("flaskbb_extensions", &args)?;

        info!(
            external = self.pluggy.list_name().len(),
            internal = self.pluggy.list_internal_name_plugin().len(),
            disabled = self.pluggy.list_disabled_plugins().len(),
            "Plugins loaded"
        );
        Ok(())
    }

    /// Fires the setup hooks plugins use to extend the application.
    pub fn configure(&mut self) -> AppResult<()> {
        if let Err(e) = self.pluggy.check_pending() {
            warn!(error = %e, "Plugin implements an unknown hook");
        }

        let app_args = hook_args!("app" => self.describe());
        for hook in SETUP_HOOKS {
            let results = self.pluggy.invoke(hook, &app_args)?;
            if hook == "flaskbb_load_blueprints" {
                self.blueprints = results;
            }
        }
        self.translations = self
            .pluggy
            .invoke("flaskbb_load_translations", &HookArgs::new())?;

        let setup_args = hook_args!(
            "app" => self.describe(),
            "pluggy" => self.plugin_summary(),
        );
        self.pluggy.invoke("flaskbb_additional_setup", &setup_args)?;
        Ok(())
    }

    /// Renders a template hook the way templates call it.
    pub fn template_hook(&self, name: &str, args: &HookArgs) -> AppResult<String> {
        Ok(self.pluggy.template_hook(name, args, true)?)
    }

    /// Names of external, internal and disabled plugins.
    pub fn plugin_summary(&self) -> Value {
        json!({
            "external": self.pluggy.list_name(),
            "internal": self
                .pluggy
                .list_internal_name_plugin()
                .into_iter()
                .map(|(name, _)| name)
                .collect::<Vec<_>>(),
            "disabled": self
                .pluggy
                .list_disabled_plugins()
                .into_iter()
                .map(|(name, _)| name)
                .collect::<Vec<_>>(),
        })
    }

    /// Names a disabled plugin's package, the way background tasks are
    /// matched against parked plugins.
    pub fn disabled_packages(&self) -> Vec<String> {
        self.pluggy
            .get_disabled_plugins()
            .iter()
            .filter_map(|p| p.package().map(str::to_string))
            .collect()
    }
}

/// Maps a missing plugin to a not-found error.
pub fn require_plugin(pluggy: &PluginManager, name: &str) -> AppResult<PluginHandle> {
    pluggy
        .get_plugin(name)
        .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' not found")))
}
