//! Hook registry: plugins' handlers by hook name, in registration order.

use std::collections::HashMap;

use tracing::debug;

use super::definitions::HookImpl;
use crate::plugin::PluginKey;

/// Entry in the hook registry.
#[derive(Debug, Clone)]
pub struct HookEntry {
    /// The handler.
    pub hookimpl: HookImpl,
    /// Canonical name of the owning plugin.
    pub plugin_name: String,
    /// Identity of the owning plugin.
    pub plugin_key: PluginKey,
}

/// Registry of hook implementations organized by hook name.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Hook name → handlers, first registered first.
    handlers: HashMap<String, Vec<HookEntry>>,
}

impl HookRegistry {
    /// Creates an empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler for its hook.
    pub fn register(&mut self, entry: HookEntry) {
        debug!(
            hook = %entry.hookimpl.hook_name(),
            plugin = %entry.plugin_name,
            "Hook implementation registered"
        );
        self.handlers
            .entry(entry.hookimpl.hook_name().to_string())
            .or_default()
            .push(entry);
    }

    /// Removes every handler owned by a plugin.
    pub fn unregister_plugin(&mut self, plugin_key: PluginKey) {
        for entries in self.handlers.values_mut() {
            entries.retain(|e| e.plugin_key != plugin_key);
        }
        self.handlers.retain(|_, entries| !entries.is_empty());
    }

    /// Returns the handlers of a hook in invocation order.
    pub fn get_impls(&self, hook: &str) -> &[HookEntry] {
        self.handlers.get(hook).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns whether any handlers are registered for a hook.
    pub fn has_impls(&self, hook: &str) -> bool {
        !self.get_impls(hook).is_empty()
    }

    /// Returns the number of handlers registered for a hook.
    pub fn impl_count(&self, hook: &str) -> usize {
        self.get_impls(hook).len()
    }

    /// Returns the hook names a plugin implements.
    pub fn hooks_of(&self, plugin_key: PluginKey) -> Vec<String> {
        let mut hooks: Vec<String> = self
            .handlers
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| e.plugin_key == plugin_key))
            .map(|(hook, _)| hook.clone())
            .collect();
        hooks.sort();
        hooks
    }

    /// Returns all hook names with at least one handler.
    pub fn registered_hooks(&self) -> Vec<String> {
        let mut hooks: Vec<String> = self.handlers.keys().cloned().collect();
        hooks.sort();
        hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Plugin, PluginHandle};

    #[derive(Debug)]
    struct Dummy;

    impl Plugin for Dummy {}

    fn entry(hook: &str, plugin: &PluginHandle, name: &str) -> HookEntry {
        HookEntry {
            hookimpl: HookImpl::new(hook, &[], |_| Ok(None)),
            plugin_name: name.to_string(),
            plugin_key: plugin.key(),
        }
    }

    #[test]
    fn test_registration_order_preserved() {
        let a = PluginHandle::new(Dummy);
        let b = PluginHandle::new(Dummy);
        let mut registry = HookRegistry::new();
        registry.register(entry("flaskbb_cli", &a, "a"));
        registry.register(entry("flaskbb_cli", &b, "b"));

        let names: Vec<&str> = registry
            .get_impls("flaskbb_cli")
            .iter()
            .map(|e| e.plugin_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_unregister_plugin_drops_empty_hooks() {
        let a = PluginHandle::new(Dummy);
        let b = PluginHandle::new(Dummy);
        let mut registry = HookRegistry::new();
        registry.register(entry("flaskbb_cli", &a, "a"));
        registry.register(entry("flaskbb_extensions", &a, "a"));
        registry.register(entry("flaskbb_cli", &b, "b"));

        registry.unregister_plugin(a.key());
        assert_eq!(registry.impl_count("flaskbb_cli"), 1);
        assert!(!registry.has_impls("flaskbb_extensions"));
        assert_eq!(registry.registered_hooks(), vec!["flaskbb_cli".to_string()]);
        assert!(registry.hooks_of(a.key()).is_empty());
    }
}
