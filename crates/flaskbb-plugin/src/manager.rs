//! Plugin manager: the host-facing registry.
//!
//! Wraps a [`BasePluginManager`] and adds the internal namespace for
//! first-party plugins, distribution metadata, the disabled-plugins table,
//! and entry-point discovery (see [`crate::loader`]).
//!
//! Internal plugins are bound in the base keyspace too, so a name can never
//! be held by an internal and an external plugin at the same time. Blocking
//! a name blocks it in both namespaces.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;
use tracing::info;

use crate::distribution::DistFacade;
use crate::error::{PluginError, PluginResult};
use crate::hooks::definitions::HookArgs;
use crate::hooks::dispatcher::{HookCaller, concat_results};
use crate::hooks::registry::HookRegistry;
use crate::hooks::spec::{HookSpec, HookSpecs};
use crate::loader::Discovery;
use crate::metadata::DistMeta;
use crate::plugin::{PluginHandle, PluginKey, PluginSelector};
use crate::registry::{BasePluginManager, PluginManagerApi};

/// A plugin recorded by an entry-point load pass.
#[derive(Debug, Clone)]
pub struct PluginDistInfo {
    /// Entry-point name.
    pub name: String,
    /// The loaded object.
    pub plugin: PluginHandle,
    /// Distribution it came from.
    pub dist: DistFacade,
}

/// Manages plugin registration, blocking, metadata, and hook dispatch.
#[derive(Debug)]
pub struct PluginManager {
    /// Generic manager holding every binding.
    pub(crate) base: BasePluginManager,
    /// Internal name → plugin.
    internal_names: HashMap<String, PluginHandle>,
    /// Internal plugin identity → name.
    internal_keys: HashMap<PluginKey, String>,
    /// Names blocked in the internal namespace.
    internal_blocked: HashSet<String>,
    /// Entry-point name → distribution descriptor. Kept after unregistration.
    pub(crate) metadata: BTreeMap<String, DistMeta>,
    /// Entry-point loaded plugins in discovery order.
    pub(crate) dist_info: Vec<PluginDistInfo>,
    /// Plugins parked by the host or found under a blocked name.
    disabled: Vec<PluginDistInfo>,
    /// Where entry points come from.
    pub(crate) discovery: Option<Discovery>,
}

impl PluginManager {
    /// Creates a manager for a project tag.
    pub fn new(project_name: &str) -> Self {
        Self {
            base: BasePluginManager::new(project_name),
            internal_names: HashMap::new(),
            internal_keys: HashMap::new(),
            internal_blocked: HashSet::new(),
            metadata: BTreeMap::new(),
            dist_info: Vec::new(),
            disabled: Vec::new(),
            discovery: None,
        }
    }

    /// Registers a plugin, optionally into the internal namespace.
    ///
    /// Returns the canonical name, or `None` when the name is blocked in
    /// either namespace.
    pub fn register_with(
        &mut self,
        plugin: PluginHandle,
        name: Option<&str>,
        internal: bool,
    ) -> PluginResult<Option<String>> {
        let plugin_name = name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| plugin.derived_name());

        if let Some(existing) = self.get_name(&plugin) {
            return Err(PluginError::AlreadyRegistered { name: existing });
        }
        if self.is_blocked(&plugin_name) {
            return Ok(None);
        }

        let key = plugin.key();
        let registered = self.base.register(plugin.clone(), Some(&plugin_name))?;

        if let Some(name) = &registered {
            if internal {
                self.internal_names.insert(name.clone(), plugin);
                self.internal_keys.insert(key, name.clone());
            }
            info!(plugin = %name, internal, "Plugin registered");
        }
        Ok(registered)
    }

    /// Registers a first-party plugin.
    pub fn register_internal(
        &mut self,
        plugin: PluginHandle,
        name: Option<&str>,
    ) -> PluginResult<Option<String>> {
        self.register_with(plugin, name, true)
    }

    /// Returns whether a registered plugin is internal.
    pub fn is_internal(&self, plugin: &PluginHandle) -> bool {
        self.internal_keys.contains_key(&plugin.key())
    }

    /// Internal `(name, plugin)` pairs in registration order.
    pub fn list_internal_name_plugin(&self) -> Vec<(String, PluginHandle)> {
        self.base
            .list_name_plugin()
            .into_iter()
            .filter(|(name, _)| self.internal_names.contains_key(name))
            .collect()
    }

    /// All internal plugins.
    pub fn get_internal_plugins(&self) -> HashSet<PluginHandle> {
        self.internal_names.values().cloned().collect()
    }

    /// All registered plugins that are not internal.
    pub fn get_external_plugins(&self) -> HashSet<PluginHandle> {
        let internal = self.get_internal_plugins();
        self.get_plugins()
            .into_iter()
            .filter(|p| !internal.contains(p))
            .collect()
    }

    /// Descriptors of every plugin discovered so far, by entry-point name.
    pub fn list_plugin_metadata(&self) -> &BTreeMap<String, DistMeta> {
        &self.metadata
    }

    /// Descriptor of one discovered plugin.
    pub fn get_metadata(&self, name: &str) -> Option<&DistMeta> {
        self.metadata.get(name)
    }

    /// Entry-point loaded plugins and their distributions, in discovery order.
    pub fn list_plugin_distinfo(&self) -> Vec<(PluginHandle, DistFacade)> {
        self.dist_info
            .iter()
            .map(|info| (info.plugin.clone(), info.dist.clone()))
            .collect()
    }

    /// `(name, distribution)` pairs of disabled plugins.
    pub fn list_disabled_plugins(&self) -> Vec<(String, DistFacade)> {
        self.disabled
            .iter()
            .map(|info| (info.name.clone(), info.dist.clone()))
            .collect()
    }

    /// Objects of disabled plugins.
    pub fn get_disabled_plugins(&self) -> Vec<PluginHandle> {
        self.disabled.iter().map(|info| info.plugin.clone()).collect()
    }

    /// Parks a plugin in the disabled table. A name is recorded once.
    pub fn add_disabled_plugin(&mut self, name: &str, plugin: PluginHandle, dist: DistFacade) {
        if self.disabled.iter().any(|info| info.name == name) {
            return;
        }
        self.disabled.push(PluginDistInfo {
            name: name.to_string(),
            plugin,
            dist,
        });
    }

    /// Adds the hook specifications of a container.
    pub fn add_hookspecs(&mut self, container: &dyn HookSpecs) -> PluginResult<()> {
        self.base.add_hookspecs(container)
    }

    /// Returns a callable view of a hook.
    pub fn hook(&self, name: &str) -> PluginResult<HookCaller<'_>> {
        self.base.hook(name)
    }

    /// Calls a hook; the first failing handler aborts the call.
    pub fn invoke(&self, name: &str, args: &HookArgs) -> PluginResult<Vec<Value>> {
        self.base.invoke(name, args)
    }

    /// Calls a hook; failing handlers are logged and skipped.
    pub fn invoke_lenient(&self, name: &str, args: &HookArgs) -> PluginResult<Vec<Value>> {
        Ok(self.hook(name)?.call_lenient(args))
    }

    /// Calls a template hook and concatenates the results into markup.
    ///
    /// An unknown hook renders as `""` when `silent` is set.
    pub fn template_hook(&self, name: &str, args: &HookArgs, silent: bool) -> PluginResult<String> {
        match self.invoke(name, args) {
            Ok(results) => Ok(concat_results(&results)),
            Err(PluginError::UnknownHook { .. }) if silent => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Fails for the first implementation whose hook was never specified.
    pub fn check_pending(&self) -> PluginResult<()> {
        self.base.check_pending()
    }

    /// Returns the hooks a registered plugin implements.
    pub fn get_hookcallers(&self, plugin: &PluginHandle) -> Option<Vec<String>> {
        self.base.get_hookcallers(plugin)
    }

    /// Returns the specifications in declaration order.
    pub fn hookspecs(&self) -> Vec<&HookSpec> {
        self.base.hookspecs()
    }

    /// Returns the hook implementation registry.
    pub fn hook_registry(&self) -> &HookRegistry {
        self.base.hook_registry()
    }

    /// Returns the generic manager underneath.
    pub fn base(&self) -> &BasePluginManager {
        &self.base
    }
}

impl PluginManagerApi for PluginManager {
    fn project_name(&self) -> &str {
        self.base.project_name()
    }

    fn register(
        &mut self,
        plugin: PluginHandle,
        name: Option<&str>,
    ) -> PluginResult<Option<String>> {
        self.register_with(plugin, name, false)
    }

    fn unregister(&mut self, selector: PluginSelector<'_>) -> Option<PluginHandle> {
        let plugin = match selector {
            PluginSelector::Name(name) if self.internal_blocked.contains(name) => return None,
            _ => self.base.unregister(selector)?,
        };

        if let Some(name) = self.internal_keys.remove(&plugin.key()) {
            self.internal_names.remove(&name);
        }
        Some(plugin)
    }

    fn set_blocked(&mut self, name: &str) {
        if self.base.has_plugin(name) {
            self.unregister(PluginSelector::Name(name));
        }
        self.base.set_blocked(name);
        self.internal_blocked.insert(name.to_string());
    }

    fn is_blocked(&self, name: &str) -> bool {
        self.base.is_blocked(name) || self.internal_blocked.contains(name)
    }

    fn get_plugin(&self, name: &str) -> Option<PluginHandle> {
        if self.internal_blocked.contains(name) {
            return None;
        }
        self.internal_names
            .get(name)
            .cloned()
            .or_else(|| self.base.get_plugin(name))
    }

    fn get_name(&self, plugin: &PluginHandle) -> Option<String> {
        self.base
            .get_name(plugin)
            .or_else(|| self.internal_keys.get(&plugin.key()).cloned())
    }

    fn list_name(&self) -> Vec<String> {
        self.base
            .list_name()
            .into_iter()
            .filter(|name| !self.internal_names.contains_key(name))
            .collect()
    }

    fn list_name_plugin(&self) -> Vec<(String, PluginHandle)> {
        self.base
            .list_name_plugin()
            .into_iter()
            .filter(|(name, _)| !self.internal_names.contains_key(name))
            .collect()
    }

    fn get_plugins(&self) -> Vec<PluginHandle> {
        self.base.get_plugins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Plugin;

    #[derive(Debug)]
    struct A;

    impl Plugin for A {}

    fn manager() -> PluginManager {
        let mut pm = PluginManager::new("flaskbb");
        pm.add_hookspecs(&crate::specs::FlaskBBSpecs).unwrap();
        pm
    }

    #[test]
    fn test_pluginmanager() {
        let mut pm = manager();
        let a1 = PluginHandle::new(A);
        let a2 = PluginHandle::new(A);

        pm.register(a1.clone(), None).unwrap();
        assert!(pm.is_registered(&a1));
        pm.register(a2.clone(), Some("hello")).unwrap();
        assert!(pm.is_registered(&a2));

        assert!(matches!(
            pm.register_internal(a1.clone(), None),
            Err(PluginError::AlreadyRegistered { .. })
        ));

        let out = pm.get_plugins();
        assert!(out.contains(&a1));
        assert!(out.contains(&a2));
        assert_eq!(pm.get_plugin("hello"), Some(a2.clone()));
        assert_eq!(pm.unregister(PluginSelector::Plugin(&a1)), Some(a1.clone()));
        assert!(!pm.is_registered(&a1));

        assert_eq!(pm.list_name_plugin(), vec![("hello".to_string(), a2.clone())]);
        assert_eq!(pm.list_name(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_register_internal() {
        let mut pm = manager();
        let a1 = PluginHandle::new(A);
        let a2 = PluginHandle::new(A);
        pm.register(a1.clone(), Some("notinternal")).unwrap();
        pm.register_internal(a2.clone(), Some("internal")).unwrap();
        assert!(pm.is_registered(&a2));

        let out = pm.list_name_plugin();
        assert!(out.contains(&("notinternal".to_string(), a1.clone())));
        assert!(!out.contains(&("internal".to_string(), a2.clone())));

        let out_internal = pm.list_internal_name_plugin();
        assert!(!out_internal.contains(&("notinternal".to_string(), a1.clone())));
        assert!(out_internal.contains(&("internal".to_string(), a2.clone())));

        assert_eq!(pm.unregister(PluginSelector::Plugin(&a2)), Some(a2));
        assert!(pm.list_internal_name_plugin().is_empty());
    }

    #[test]
    fn test_set_blocked() {
        let mut pm = manager();
        let a1 = PluginHandle::new(A);
        let name = pm.register(a1.clone(), None).unwrap().unwrap();
        assert!(pm.is_registered(&a1));
        assert!(!pm.is_blocked(&name));

        pm.set_blocked(&name);
        assert!(pm.is_blocked(&name));
        assert!(!pm.is_registered(&a1));

        pm.set_blocked("somename");
        assert!(pm.is_blocked("somename"));
        assert_eq!(pm.register(PluginHandle::new(A), Some("somename")).unwrap(), None);
        assert!(pm.unregister(PluginSelector::Name("somename")).is_none());
        assert!(pm.is_blocked("somename"));
    }

    #[test]
    fn test_set_blocked_internal() {
        let mut pm = manager();
        let a1 = PluginHandle::new(A);
        let name = pm.register_internal(a1.clone(), None).unwrap().unwrap();
        assert!(pm.is_registered(&a1));
        assert!(!pm.is_blocked(&name));

        pm.set_blocked(&name);
        assert!(pm.is_blocked(&name));
        assert!(!pm.is_registered(&a1));
        assert!(pm.get_internal_plugins().is_empty());
        assert_eq!(pm.register_internal(PluginHandle::new(A), Some(name.as_str())).unwrap(), None);
    }

    #[test]
    fn test_get_internal_plugin_and_name() {
        let mut pm = manager();
        let a1 = PluginHandle::new(A);
        let a2 = PluginHandle::new(A);
        pm.register(a1.clone(), Some("notinternal")).unwrap();
        pm.register_internal(a2.clone(), Some("internal")).unwrap();

        assert_eq!(pm.get_plugin("notinternal"), Some(a1.clone()));
        assert_eq!(pm.get_plugin("internal"), Some(a2.clone()));
        assert_eq!(pm.get_name(&a1), Some("notinternal".to_string()));
        assert_eq!(pm.get_name(&a2), Some("internal".to_string()));
    }

    #[test]
    fn test_internal_external_partition() {
        let mut pm = manager();
        let a1 = PluginHandle::new(A);
        let a2 = PluginHandle::new(A);
        pm.register(a1.clone(), Some("portal")).unwrap();
        pm.register_internal(a2.clone(), Some("flaskbb.auth")).unwrap();

        assert!(pm.is_internal(&a2));
        assert_eq!(pm.get_internal_plugins(), HashSet::from([a2.clone()]));
        assert_eq!(pm.get_external_plugins(), HashSet::from([a1]));
        assert!(matches!(
            pm.register(PluginHandle::new(A), Some("flaskbb.auth")),
            Err(PluginError::NameConflict { .. })
        ));
    }

    #[test]
    fn test_template_hook() {
        let pm = manager();
        assert_eq!(
            pm.template_hook("flaskbb_tpl_before_navigation", &HookArgs::new(), false)
                .unwrap(),
            ""
        );
        assert_eq!(
            pm.template_hook("flaskbb_tpl_nowhere", &HookArgs::new(), true)
                .unwrap(),
            ""
        );
        assert!(matches!(
            pm.template_hook("flaskbb_tpl_nowhere", &HookArgs::new(), false),
            Err(PluginError::UnknownHook { .. })
        ));
    }
}
