//! Plugin objects and their identity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::hooks::definitions::HookImpl;

/// Trait that all plugins must implement.
///
/// A plugin is an opaque object contributed by a package. The registry
/// never mutates it; it only asks it for a name and for the hook
/// implementations it offers.
pub trait Plugin: Send + Sync + fmt::Debug {
    /// Name to register under when the caller supplies none.
    fn canonical_name(&self) -> Option<String> {
        None
    }

    /// Hook implementations this plugin offers.
    fn hookimpls(&self) -> Vec<HookImpl> {
        Vec::new()
    }

    /// Package the plugin ships in, if it knows.
    fn package(&self) -> Option<&str> {
        None
    }
}

/// Identity token of a plugin object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKey(usize);

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to a plugin object.
///
/// Equality and hashing follow object identity: two handles are equal only
/// when they point at the same allocation, regardless of the plugin's
/// contents.
#[derive(Clone)]
pub struct PluginHandle(Arc<dyn Plugin>);

impl PluginHandle {
    /// Wraps a plugin value.
    pub fn new<P: Plugin + 'static>(plugin: P) -> Self {
        Self(Arc::new(plugin))
    }

    /// Wraps an already shared plugin.
    pub fn from_arc(plugin: Arc<dyn Plugin>) -> Self {
        Self(plugin)
    }

    /// Returns the identity token.
    pub fn key(&self) -> PluginKey {
        PluginKey(Arc::as_ptr(&self.0).cast::<()>() as usize)
    }

    /// Returns the name used when registration supplies none.
    ///
    /// Falls back to the identity token, so the same object always derives
    /// the same name.
    pub fn derived_name(&self) -> String {
        self.0
            .canonical_name()
            .unwrap_or_else(|| self.key().to_string())
    }

    /// Returns the shared plugin.
    pub fn as_arc(&self) -> &Arc<dyn Plugin> {
        &self.0
    }
}

impl Deref for PluginHandle {
    type Target = dyn Plugin;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for PluginHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PluginHandle {}

impl Hash for PluginHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("key", &self.key())
            .field("plugin", &self.0)
            .finish()
    }
}

impl<P: Plugin + 'static> From<Arc<P>> for PluginHandle {
    fn from(plugin: Arc<P>) -> Self {
        Self(plugin)
    }
}

/// Selects the plugin an unregistration applies to.
#[derive(Debug, Clone, Copy)]
pub enum PluginSelector<'a> {
    /// By object identity.
    Plugin(&'a PluginHandle),
    /// By canonical name.
    Name(&'a str),
}

impl<'a> From<&'a PluginHandle> for PluginSelector<'a> {
    fn from(plugin: &'a PluginHandle) -> Self {
        Self::Plugin(plugin)
    }
}

impl<'a> From<&'a str> for PluginSelector<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}
