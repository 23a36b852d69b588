//! Plugin registry: the generic manager contract and its base implementation.
//!
//! [`BasePluginManager`] owns one keyspace of canonical names, the set of
//! blocked names, and the hook specification and implementation registries.
//! [`crate::manager::PluginManager`] layers the internal namespace on top of
//! it by delegation.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PluginError, PluginResult};
use crate::hooks::definitions::{HookArgs, HookImpl};
use crate::hooks::dispatcher::HookCaller;
use crate::hooks::registry::{HookEntry, HookRegistry};
use crate::hooks::spec::{HookSpec, HookSpecRegistry, HookSpecs};
use crate::plugin::{PluginHandle, PluginKey, PluginSelector};

/// Operations every plugin manager offers.
pub trait PluginManagerApi {
    /// Project tag hook specifications must carry.
    fn project_name(&self) -> &str;

    /// Registers a plugin and returns its canonical name, or `None` when the
    /// name is blocked.
    ///
    /// Fails when the object is already registered or another object holds
    /// the name.
    fn register(&mut self, plugin: PluginHandle, name: Option<&str>)
    -> PluginResult<Option<String>>;

    /// Unregisters a plugin and its hook implementations.
    ///
    /// Returns the removed object, or `None` if nothing matched. A blocked
    /// name stays blocked.
    fn unregister(&mut self, selector: PluginSelector<'_>) -> Option<PluginHandle>;

    /// Blocks a name, unregistering whatever is bound to it.
    fn set_blocked(&mut self, name: &str);

    /// Returns whether a name is blocked.
    fn is_blocked(&self, name: &str) -> bool;

    /// Returns the plugin bound to a name.
    fn get_plugin(&self, name: &str) -> Option<PluginHandle>;

    /// Returns the canonical name of a registered plugin.
    fn get_name(&self, plugin: &PluginHandle) -> Option<String>;

    /// Returns whether the object is registered.
    fn is_registered(&self, plugin: &PluginHandle) -> bool {
        self.get_name(plugin).is_some()
    }

    /// Returns whether a plugin is bound to a name.
    fn has_plugin(&self, name: &str) -> bool {
        self.get_plugin(name).is_some()
    }

    /// Bound names in registration order.
    fn list_name(&self) -> Vec<String>;

    /// Bound `(name, plugin)` pairs in registration order.
    fn list_name_plugin(&self) -> Vec<(String, PluginHandle)>;

    /// All registered plugins in registration order.
    fn get_plugins(&self) -> Vec<PluginHandle>;
}

/// The generic plugin manager: one name keyspace plus hook registries.
#[derive(Debug)]
pub struct BasePluginManager {
    /// Project tag.
    project_name: String,
    /// Canonical name → bound plugin. Never holds blocked names.
    name_to_plugin: HashMap<String, PluginHandle>,
    /// Bound names in registration order.
    order: Vec<String>,
    /// Plugin identity → canonical name.
    plugin_names: HashMap<PluginKey, String>,
    /// Names no plugin may bind.
    blocked: HashSet<String>,
    /// Hook specifications.
    specs: HookSpecRegistry,
    /// Hook implementations.
    hooks: HookRegistry,
}

impl BasePluginManager {
    /// Creates a manager for a project tag.
    pub fn new(project_name: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            name_to_plugin: HashMap::new(),
            order: Vec::new(),
            plugin_names: HashMap::new(),
            blocked: HashSet::new(),
            specs: HookSpecRegistry::new(),
            hooks: HookRegistry::new(),
        }
    }

    /// Adds the specifications of a container that carry this project's tag.
    ///
    /// Already registered implementations of each hook are validated against
    /// the new specification before anything is stored.
    pub fn add_hookspecs(&mut self, container: &dyn HookSpecs) -> PluginResult<()> {
        let specs: Vec<HookSpec> = container
            .specs()
            .into_iter()
            .filter(|s| s.project == self.project_name)
            .collect();

        if specs.is_empty() {
            return Err(PluginError::NoHookSpecs {
                project: self.project_name.clone(),
                container: container.describe(),
            });
        }

        for spec in &specs {
            self.specs.check(spec)?;
            for entry in self.hooks.get_impls(&spec.name) {
                Self::verify_hookimpl(spec, &entry.plugin_name, &entry.hookimpl)?;
            }
        }

        let count = specs.len();
        for spec in specs {
            self.specs.add(spec)?;
        }

        info!(
            project = %self.project_name,
            container = %container.describe(),
            specs = count,
            "Hook specifications added"
        );
        Ok(())
    }

    /// Returns a callable view of a hook.
    pub fn hook(&self, name: &str) -> PluginResult<HookCaller<'_>> {
        let spec = self.specs.get(name);
        let entries = self.hooks.get_impls(name);

        let hook_name = match (spec, entries.first()) {
            (Some(spec), _) => spec.name.as_str(),
            (None, Some(entry)) => entry.hookimpl.hook_name(),
            (None, None) => {
                return Err(PluginError::UnknownHook {
                    hook: name.to_string(),
                });
            }
        };
        Ok(HookCaller::new(hook_name, spec, entries))
    }

    /// Calls a hook and returns the handlers' results in registration order.
    pub fn invoke(&self, name: &str, args: &HookArgs) -> PluginResult<Vec<Value>> {
        self.hook(name)?.call(args)
    }

    /// Fails for the first implementation whose hook was never specified.
    pub fn check_pending(&self) -> PluginResult<()> {
        for hook in self.hooks.registered_hooks() {
            if self.specs.contains(&hook) {
                continue;
            }
            if let Some(entry) = self.hooks.get_impls(&hook).first() {
                return Err(PluginError::PendingImpl {
                    plugin: entry.plugin_name.clone(),
                    hook,
                });
            }
        }
        Ok(())
    }

    /// Returns the hooks a registered plugin implements.
    pub fn get_hookcallers(&self, plugin: &PluginHandle) -> Option<Vec<String>> {
        self.plugin_names
            .contains_key(&plugin.key())
            .then(|| self.hooks.hooks_of(plugin.key()))
    }

    /// Returns the specifications in declaration order.
    pub fn hookspecs(&self) -> Vec<&HookSpec> {
        self.specs.list()
    }

    /// Returns the hook implementation registry.
    pub fn hook_registry(&self) -> &HookRegistry {
        &self.hooks
    }

    fn verify_hookimpl(spec: &HookSpec, plugin: &str, hookimpl: &HookImpl) -> PluginResult<()> {
        match spec.surplus_arg(hookimpl.argnames()) {
            Some(argument) => Err(PluginError::ArgMismatch {
                plugin: plugin.to_string(),
                hook: spec.name.clone(),
                argument: argument.clone(),
                accepted: spec.argnames.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl PluginManagerApi for BasePluginManager {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn register(
        &mut self,
        plugin: PluginHandle,
        name: Option<&str>,
    ) -> PluginResult<Option<String>> {
        let plugin_name = name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| plugin.derived_name());

        if let Some(existing) = self.plugin_names.get(&plugin.key()) {
            return Err(PluginError::AlreadyRegistered {
                name: existing.clone(),
            });
        }
        if self.blocked.contains(&plugin_name) {
            debug!(plugin = %plugin_name, "Registration skipped, name is blocked");
            return Ok(None);
        }
        if self.name_to_plugin.contains_key(&plugin_name) {
            return Err(PluginError::NameConflict { name: plugin_name });
        }

        // Validate everything before binding so a rejected plugin leaves no trace.
        let hookimpls = plugin.hookimpls();
        for hookimpl in &hookimpls {
            if let Some(spec) = self.specs.get(hookimpl.hook_name()) {
                Self::verify_hookimpl(spec, &plugin_name, hookimpl)?;
            }
        }

        let key = plugin.key();
        self.name_to_plugin.insert(plugin_name.clone(), plugin);
        self.order.push(plugin_name.clone());
        self.plugin_names.insert(key, plugin_name.clone());

        let hook_count = hookimpls.len();
        for hookimpl in hookimpls {
            self.hooks.register(HookEntry {
                hookimpl,
                plugin_name: plugin_name.clone(),
                plugin_key: key,
            });
        }

        debug!(plugin = %plugin_name, hooks = hook_count, "Plugin registered");
        Ok(Some(plugin_name))
    }

    fn unregister(&mut self, selector: PluginSelector<'_>) -> Option<PluginHandle> {
        let name = match selector {
            PluginSelector::Plugin(plugin) => self.plugin_names.get(&plugin.key())?.clone(),
            PluginSelector::Name(name) => name.to_string(),
        };
        let plugin = self.name_to_plugin.remove(&name)?;

        self.hooks.unregister_plugin(plugin.key());
        self.order.retain(|n| n != &name);
        self.plugin_names.remove(&plugin.key());

        debug!(plugin = %name, "Plugin unregistered");
        Some(plugin)
    }

    fn set_blocked(&mut self, name: &str) {
        if self.name_to_plugin.contains_key(name) {
            self.unregister(PluginSelector::Name(name));
        }
        if self.blocked.insert(name.to_string()) {
            info!(plugin = %name, "Plugin name blocked");
        }
    }

    fn is_blocked(&self, name: &str) -> bool {
        self.blocked.contains(name)
    }

    fn get_plugin(&self, name: &str) -> Option<PluginHandle> {
        self.name_to_plugin.get(name).cloned()
    }

    fn get_name(&self, plugin: &PluginHandle) -> Option<String> {
        self.plugin_names.get(&plugin.key()).cloned()
    }

    fn list_name(&self) -> Vec<String> {
        self.order.clone()
    }

    fn list_name_plugin(&self) -> Vec<(String, PluginHandle)> {
        self.order
            .iter()
            .filter_map(|n| self.name_to_plugin.get(n).map(|p| (n.clone(), p.clone())))
            .collect()
    }

    fn get_plugins(&self) -> Vec<PluginHandle> {
        self.order
            .iter()
            .filter_map(|n| self.name_to_plugin.get(n).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Plugin;
    use serde_json::json;

    #[derive(Debug)]
    struct A;

    impl Plugin for A {}

    #[derive(Debug)]
    struct Cli;

    impl Plugin for Cli {
        fn hookimpls(&self) -> Vec<HookImpl> {
            vec![HookImpl::new("flaskbb_cli", &["cli"], |args| {
                Ok(args.get::<&'static str>("cli").map(|c| json!(format!("{c}:plugins"))))
            })]
        }
    }

    #[derive(Debug)]
    struct Greedy;

    impl Plugin for Greedy {
        fn hookimpls(&self) -> Vec<HookImpl> {
            vec![HookImpl::new("flaskbb_cli", &["cli", "db"], |_| Ok(None))]
        }
    }

    struct CliSpec;

    impl HookSpecs for CliSpec {
        fn specs(&self) -> Vec<HookSpec> {
            vec![HookSpec::new("flaskbb", "flaskbb_cli", &["cli"])]
        }
    }

    struct OtherProject;

    impl HookSpecs for OtherProject {
        fn specs(&self) -> Vec<HookSpec> {
            vec![HookSpec::new("pytest", "pytest_configure", &["config"])]
        }
    }

    #[test]
    fn test_register_and_unregister() {
        let mut pm = BasePluginManager::new("flaskbb");
        let a1 = PluginHandle::new(A);
        let a2 = PluginHandle::new(A);

        let n1 = pm.register(a1.clone(), None).unwrap().unwrap();
        assert_eq!(n1, a1.derived_name());
        assert!(matches!(
            pm.register(a1.clone(), Some("hello")),
            Err(PluginError::AlreadyRegistered { .. })
        ));
        assert_eq!(
            pm.register(a2.clone(), Some("hello")).unwrap(),
            Some("hello".to_string())
        );
        assert_eq!(pm.get_plugins(), vec![a1.clone(), a2.clone()]);

        assert_eq!(pm.unregister(PluginSelector::Plugin(&a1)), Some(a1.clone()));
        assert!(!pm.is_registered(&a1));
        assert_eq!(pm.list_name(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_name_conflict() {
        let mut pm = BasePluginManager::new("flaskbb");
        pm.register(PluginHandle::new(A), Some("portal")).unwrap();
        let err = pm.register(PluginHandle::new(A), Some("portal")).unwrap_err();
        assert!(matches!(err, PluginError::NameConflict { ref name } if name == "portal"));
    }

    #[test]
    fn test_blocked_name_refuses_registration() {
        let mut pm = BasePluginManager::new("flaskbb");
        let a = PluginHandle::new(A);
        pm.register(a.clone(), Some("portal")).unwrap();

        pm.set_blocked("portal");
        assert!(pm.is_blocked("portal"));
        assert!(!pm.is_registered(&a));
        assert_eq!(pm.register(PluginHandle::new(A), Some("portal")).unwrap(), None);
        assert!(pm.unregister(PluginSelector::Name("portal")).is_none());
        assert!(pm.is_blocked("portal"));
    }

    #[test]
    fn test_hook_dispatch_and_unregister_removes_impls() {
        let mut pm = BasePluginManager::new("flaskbb");
        pm.add_hookspecs(&CliSpec).unwrap();
        let cli = PluginHandle::new(Cli);
        pm.register(cli.clone(), Some("cli")).unwrap();

        let results = pm
            .invoke("flaskbb_cli", &HookArgs::new().with("cli", "flaskbb"))
            .unwrap();
        assert_eq!(results, vec![json!("flaskbb:plugins")]);
        assert_eq!(
            pm.get_hookcallers(&cli),
            Some(vec!["flaskbb_cli".to_string()])
        );

        pm.unregister(PluginSelector::Plugin(&cli));
        assert!(pm.invoke("flaskbb_cli", &HookArgs::new()).unwrap().is_empty());
        assert_eq!(pm.get_hookcallers(&cli), None);
    }

    #[test]
    fn test_surplus_argument_rejected_at_registration() {
        let mut pm = BasePluginManager::new("flaskbb");
        pm.add_hookspecs(&CliSpec).unwrap();
        let greedy = PluginHandle::new(Greedy);

        let err = pm.register(greedy.clone(), Some("greedy")).unwrap_err();
        assert!(matches!(err, PluginError::ArgMismatch { ref argument, .. } if argument == "db"));
        assert!(!pm.is_registered(&greedy));
        assert!(pm.list_name().is_empty());
    }

    #[test]
    fn test_late_binding_validates_when_spec_arrives() {
        let mut pm = BasePluginManager::new("flaskbb");
        pm.register(PluginHandle::new(Greedy), Some("greedy")).unwrap();
        assert!(matches!(
            pm.check_pending(),
            Err(PluginError::PendingImpl { ref hook, .. }) if hook == "flaskbb_cli"
        ));

        let err = pm.add_hookspecs(&CliSpec).unwrap_err();
        assert!(matches!(err, PluginError::ArgMismatch { .. }));
        assert!(pm.hookspecs().is_empty());
    }

    #[test]
    fn test_specs_of_other_projects_are_ignored() {
        let mut pm = BasePluginManager::new("flaskbb");
        let err = pm.add_hookspecs(&OtherProject).unwrap_err();
        assert!(matches!(err, PluginError::NoHookSpecs { .. }));
    }

    #[test]
    fn test_unknown_hook() {
        let pm = BasePluginManager::new("flaskbb");
        assert!(matches!(
            pm.invoke("flaskbb_nope", &HookArgs::new()),
            Err(PluginError::UnknownHook { .. })
        ));
    }
}
