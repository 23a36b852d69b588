//! Entry-point discovery.
//!
//! A [`Discovery`] pairs a [`DistributionSource`] (what is installed) with a
//! [`PluginResolver`] (how an entry point's `module:attr` value becomes a
//! plugin object). [`PluginManager::load_setuptools_entrypoints`] walks the
//! source and routes every matching entry point through the registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::distribution::{DistFacade, Distribution, DistributionSource, EntryPoint};
use crate::error::{PluginError, PluginResult};
use crate::manager::{PluginDistInfo, PluginManager};
use crate::metadata::DistMeta;
use crate::plugin::PluginHandle;
use crate::registry::PluginManagerApi;

/// Turns an entry point into a plugin object.
pub trait PluginResolver: Send + Sync + fmt::Debug {
    /// Loads the object an entry point references.
    fn resolve(&self, entry_point: &EntryPoint, dist: &Distribution) -> PluginResult<PluginHandle>;
}

/// Constructor of a statically linked plugin.
pub type PluginFactory = Arc<dyn Fn() -> PluginHandle + Send + Sync>;

/// Resolves entry points against factories compiled into the host.
///
/// Factories are keyed by the entry point's value. A value with an
/// attribute part (`module:attr`) falls back to its module when no factory
/// matches the full value.
#[derive(Clone, Default)]
pub struct FactoryResolver {
    factories: HashMap<String, PluginFactory>,
}

impl FactoryResolver {
    /// Creates a resolver with no factories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory for an entry-point value.
    pub fn register<F>(&mut self, value: &str, factory: F)
    where
        F: Fn() -> PluginHandle + Send + Sync + 'static,
    {
        self.factories.insert(value.trim().to_string(), Arc::new(factory));
    }

    /// Adds a factory, builder style.
    pub fn with<F>(mut self, value: &str, factory: F) -> Self
    where
        F: Fn() -> PluginHandle + Send + Sync + 'static,
    {
        self.register(value, factory);
        self
    }

    /// Returns whether a factory exists for `value`.
    pub fn contains(&self, value: &str) -> bool {
        self.factories.contains_key(value.trim())
    }
}

impl fmt::Debug for FactoryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut values: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        values.sort_unstable();
        f.debug_struct("FactoryResolver")
            .field("values", &values)
            .finish()
    }
}

impl PluginResolver for FactoryResolver {
    fn resolve(&self, entry_point: &EntryPoint, _dist: &Distribution) -> PluginResult<PluginHandle> {
        self.factories
            .get(entry_point.value.trim())
            .or_else(|| self.factories.get(entry_point.module()))
            .map(|factory| factory())
            .ok_or_else(|| PluginError::PluginLoad {
                name: entry_point.name.clone(),
                reason: format!("no plugin factory for `{}`", entry_point.value),
            })
    }
}

#[cfg(feature = "dynamic")]
pub mod dynamic_resolver {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use tracing::info;

    use super::PluginResolver;
    use crate::distribution::{Distribution, EntryPoint};
    use crate::error::{PluginError, PluginResult};
    use crate::plugin::{Plugin, PluginHandle};

    /// Type of the constructor exported by dynamic plugins.
    ///
    /// Dynamic plugins must export: `extern "C" fn create_plugin() -> *mut dyn Plugin`
    /// returning a pointer obtained from `Box::into_raw`.
    pub type CreatePluginFn = unsafe extern "C" fn() -> *mut dyn Plugin;

    const DEFAULT_SYMBOL: &str = "create_plugin";

    /// Resolves entry points to shared libraries under one directory.
    ///
    /// The entry point's module names the library (dots become
    /// underscores, platform prefix and suffix added) and its attribute
    /// names the constructor symbol, `create_plugin` by default.
    ///
    /// Loaded libraries stay open for the lifetime of the resolver; plugin
    /// handles must not outlive it.
    pub struct DynamicResolver {
        root: PathBuf,
        libraries: Mutex<Vec<libloading::Library>>,
    }

    impl DynamicResolver {
        /// Creates a resolver looking for libraries under `root`.
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self {
                root: root.into(),
                libraries: Mutex::new(Vec::new()),
            }
        }

        fn library_path(&self, entry_point: &EntryPoint) -> PathBuf {
            let stem = entry_point.module().replace('.', "_");
            self.root.join(libloading::library_filename(stem))
        }
    }

    impl PluginResolver for DynamicResolver {
        fn resolve(
            &self,
            entry_point: &EntryPoint,
            _dist: &Distribution,
        ) -> PluginResult<PluginHandle> {
            let path = self.library_path(entry_point);
            let symbol = entry_point.attr().unwrap_or(DEFAULT_SYMBOL);
            let load_error = |reason: String| PluginError::PluginLoad {
                name: entry_point.name.clone(),
                reason,
            };

            // SAFETY: loading a library runs its initializers. Only trusted
            // plugin directories may be configured.
            let lib = unsafe { libloading::Library::new(&path) }.map_err(|e| {
                load_error(format!("failed to load library '{}': {e}", path.display()))
            })?;

            // SAFETY: the symbol is required to have the `CreatePluginFn`
            // signature and to return a pointer from `Box::into_raw`.
            let plugin = unsafe {
                let create_fn: libloading::Symbol<CreatePluginFn> =
                    lib.get(symbol.as_bytes()).map_err(|e| {
                        load_error(format!(
                            "library '{}' missing '{symbol}' symbol: {e}",
                            path.display()
                        ))
                    })?;
                Box::from_raw(create_fn())
            };

            info!(
                plugin = %entry_point.name,
                path = %path.display(),
                "Dynamic plugin loaded"
            );

            self.libraries
                .lock()
                .map_err(|e| load_error(e.to_string()))?
                .push(lib);

            Ok(PluginHandle::from_arc(plugin.into()))
        }
    }

    impl std::fmt::Debug for DynamicResolver {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let loaded = self.libraries.lock().map(|libs| libs.len()).unwrap_or_default();
            f.debug_struct("DynamicResolver")
                .field("root", &self.root)
                .field("loaded_count", &loaded)
                .finish()
        }
    }
}

#[cfg(feature = "dynamic")]
pub use dynamic_resolver::DynamicResolver;

/// Where entry points come from and how they are loaded.
#[derive(Debug)]
pub struct Discovery {
    source: Box<dyn DistributionSource>,
    resolver: Box<dyn PluginResolver>,
}

impl Discovery {
    /// Pairs a distribution source with a resolver.
    pub fn new(
        source: impl DistributionSource + 'static,
        resolver: impl PluginResolver + 'static,
    ) -> Self {
        Self {
            source: Box::new(source),
            resolver: Box::new(resolver),
        }
    }
}

impl PluginManager {
    /// Creates a manager that discovers plugins through `discovery`.
    pub fn with_discovery(project_name: &str, discovery: Discovery) -> Self {
        let mut manager = Self::new(project_name);
        manager.set_discovery(discovery);
        manager
    }

    /// Replaces the discovery used by later load passes.
    pub fn set_discovery(&mut self, discovery: Discovery) {
        self.discovery = Some(discovery);
    }

    /// Loads and registers plugins advertised under an entry-point group.
    ///
    /// Entry points whose name is already registered are skipped, so
    /// repeated passes register each plugin at most once. Load failures are
    /// logged and skipped. A plugin found under a blocked name keeps its
    /// metadata and goes to the disabled table instead of the registry.
    ///
    /// Returns the number of plugins registered by this pass.
    pub fn load_setuptools_entrypoints(&mut self, group: &str, name: Option<&str>) -> usize {
        let Some(discovery) = self.discovery.take() else {
            warn!(group, "No plugin discovery configured");
            return 0;
        };

        let mut count = 0;
        for dist in discovery.source.distributions() {
            for entry_point in dist.entry_points_in(group) {
                if name.is_some_and(|n| n != entry_point.name) {
                    continue;
                }
                if self.load_entrypoint(discovery.resolver.as_ref(), entry_point, &dist) {
                    count += 1;
                }
            }
        }
        self.discovery = Some(discovery);

        debug!(group, registered = count, "Entry-point pass finished");
        count
    }

    /// Handles one entry point; returns whether a plugin was registered.
    fn load_entrypoint(
        &mut self,
        resolver: &dyn PluginResolver,
        entry_point: &EntryPoint,
        dist: &Arc<Distribution>,
    ) -> bool {
        let ep_name = entry_point.name.as_str();
        if self.has_plugin(ep_name) {
            return false;
        }
        let blocked = self.is_blocked(ep_name);
        if blocked && self.dist_info.iter().any(|info| info.name == ep_name) {
            return false;
        }

        let plugin = match resolver.resolve(entry_point, dist) {
            Ok(plugin) => plugin,
            Err(e) => {
                error!(
                    plugin = %ep_name,
                    distribution = %dist.name,
                    error = %e,
                    "Failed to load plugin"
                );
                return false;
            }
        };

        let facade = DistFacade::new(Arc::clone(dist));
        let info = PluginDistInfo {
            name: ep_name.to_string(),
            plugin: plugin.clone(),
            dist: facade.clone(),
        };
        match self.dist_info.iter_mut().find(|i| i.name == ep_name) {
            Some(existing) => *existing = info,
            None => self.dist_info.push(info),
        }
        self.metadata
            .insert(ep_name.to_string(), DistMeta::from_distribution(ep_name, dist));

        if blocked {
            info!(plugin = %ep_name, "Plugin is disabled, not registering");
            self.add_disabled_plugin(ep_name, plugin, facade);
            return false;
        }

        match self.register(plugin, Some(ep_name)) {
            Ok(Some(_)) => {
                info!(
                    plugin = %ep_name,
                    distribution = %dist.name,
                    version = %dist.version,
                    "Plugin loaded"
                );
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!(plugin = %ep_name, error = %e, "Failed to register plugin");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::InstalledDistributions;
    use crate::plugin::Plugin;

    const GROUP: &str = "flaskbb_plugins";

    #[derive(Debug)]
    struct Portal;

    impl Plugin for Portal {}

    fn installed() -> InstalledDistributions {
        InstalledDistributions::new()
            .with(
                Distribution::new("flaskbb-plugin-portal", "1.1.3")
                    .with_metadata("Summary", "A Portal Plugin for FlaskBB")
                    .with_metadata("Author", "Peter Justin")
                    .with_entry_point(GROUP, "portal", "flaskbb_portal")
                    .with_entry_point("console_scripts", "portal-admin", "flaskbb_portal.cli:main"),
            )
            .with(
                Distribution::new("flaskbb-plugin-broken", "0.1")
                    .with_entry_point(GROUP, "broken", "flaskbb_broken"),
            )
    }

    fn resolver() -> FactoryResolver {
        FactoryResolver::new().with("flaskbb_portal", || PluginHandle::new(Portal))
    }

    fn manager() -> PluginManager {
        PluginManager::with_discovery("flaskbb", Discovery::new(installed(), resolver()))
    }

    #[test]
    fn test_load_registers_matching_entry_points() {
        let mut pm = manager();
        assert_eq!(pm.load_setuptools_entrypoints(GROUP, None), 1);

        assert!(pm.has_plugin("portal"));
        assert!(!pm.has_plugin("broken"));
        assert!(!pm.has_plugin("portal-admin"));

        let meta = pm.get_metadata("portal").unwrap();
        assert_eq!(meta.package_name, "flaskbb-plugin-portal");
        assert_eq!(meta.author, "Peter Justin");

        let distinfo = pm.list_plugin_distinfo();
        assert_eq!(distinfo.len(), 1);
        assert_eq!(distinfo[0].1.project_name(), "flaskbb-plugin-portal");
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let mut pm = manager();
        assert_eq!(pm.load_setuptools_entrypoints(GROUP, None), 1);
        assert_eq!(pm.load_setuptools_entrypoints(GROUP, None), 0);
        assert_eq!(pm.list_plugin_distinfo().len(), 1);
        assert_eq!(pm.list_name(), vec!["portal".to_string()]);
    }

    #[test]
    fn test_name_filter() {
        let mut pm = manager();
        assert_eq!(pm.load_setuptools_entrypoints(GROUP, Some("other")), 0);
        assert!(pm.list_plugin_metadata().is_empty());
        assert_eq!(pm.load_setuptools_entrypoints(GROUP, Some("portal")), 1);
    }

    #[test]
    fn test_blocked_entry_point_keeps_metadata() {
        let mut pm = manager();
        pm.set_blocked("portal");

        assert_eq!(pm.load_setuptools_entrypoints(GROUP, None), 0);
        assert_eq!(pm.load_setuptools_entrypoints(GROUP, None), 0);

        assert!(!pm.has_plugin("portal"));
        assert!(pm.get_metadata("portal").is_some());
        assert_eq!(pm.list_plugin_distinfo().len(), 1);

        let disabled = pm.list_disabled_plugins();
        assert_eq!(disabled.len(), 1);
        assert_eq!(disabled[0].0, "portal");
        assert_eq!(pm.get_disabled_plugins().len(), 1);
    }

    #[test]
    fn test_without_discovery_loads_nothing() {
        let mut pm = PluginManager::new("flaskbb");
        assert_eq!(pm.load_setuptools_entrypoints(GROUP, None), 0);
    }

    #[test]
    fn test_factory_resolver_falls_back_to_module() {
        let resolver = resolver();
        let dist = Distribution::new("flaskbb-plugin-portal", "1.1.3");
        let ep = EntryPoint::new(GROUP, "portal", "flaskbb_portal:PortalPlugin");
        assert!(resolver.resolve(&ep, &dist).is_ok());

        let missing = EntryPoint::new(GROUP, "nope", "nope:Plugin");
        assert!(matches!(
            resolver.resolve(&missing, &dist),
            Err(PluginError::PluginLoad { ref name, .. }) if name == "nope"
        ));
    }
}
