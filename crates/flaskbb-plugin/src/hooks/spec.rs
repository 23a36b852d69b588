//! Hook specifications: the extension points a host publishes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PluginError, PluginResult};

/// Declaration of one named extension point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSpec {
    /// Hook name.
    pub name: String,
    /// Parameters handlers may accept.
    pub argnames: Vec<String>,
    /// Project tag of the marker that declared it.
    pub project: String,
}

impl HookSpec {
    /// Creates a specification.
    pub fn new(project: &str, name: &str, argnames: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            argnames: argnames.iter().map(|a| a.to_string()).collect(),
            project: project.to_string(),
        }
    }

    /// Returns the first parameter in `argnames` this spec does not accept.
    pub fn surplus_arg<'a>(&self, argnames: &'a [String]) -> Option<&'a String> {
        argnames.iter().find(|a| !self.argnames.contains(a))
    }
}

/// A container of hook specifications, such as a host's spec module.
pub trait HookSpecs {
    /// Human-readable description used in error messages.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// The specifications it declares.
    fn specs(&self) -> Vec<HookSpec>;
}

/// Keyed store of hook specifications for one project tag.
#[derive(Debug, Default)]
pub struct HookSpecRegistry {
    /// Hook name → specification.
    specs: HashMap<String, HookSpec>,
    /// Hook names in declaration order.
    order: Vec<String>,
}

impl HookSpecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a declaration against what is already stored.
    ///
    /// Returns `Ok(true)` when the spec is new, `Ok(false)` when an
    /// identical spec exists.
    pub fn check(&self, spec: &HookSpec) -> PluginResult<bool> {
        match self.specs.get(&spec.name) {
            None => Ok(true),
            Some(existing) if existing.argnames == spec.argnames => Ok(false),
            Some(existing) => Err(PluginError::SpecConflict {
                hook: spec.name.clone(),
                existing: existing.argnames.clone(),
                declared: spec.argnames.clone(),
            }),
        }
    }

    /// Stores a specification. Re-adding an identical one is a no-op.
    pub fn add(&mut self, spec: HookSpec) -> PluginResult<()> {
        if self.check(&spec)? {
            debug!(hook = %spec.name, args = ?spec.argnames, "Hook specification added");
            self.order.push(spec.name.clone());
            self.specs.insert(spec.name.clone(), spec);
        }
        Ok(())
    }

    /// Gets a specification by hook name.
    pub fn get(&self, name: &str) -> Option<&HookSpec> {
        self.specs.get(name)
    }

    /// Returns whether a hook name is specified.
    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Returns all specifications in declaration order.
    pub fn list(&self) -> Vec<&HookSpec> {
        self.order.iter().filter_map(|n| self.specs.get(n)).collect()
    }

    /// Returns the number of specifications.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns whether nothing is specified.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
