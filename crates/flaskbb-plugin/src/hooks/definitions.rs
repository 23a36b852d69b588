//! Hook arguments and hook implementations.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use flaskbb_core::result::AppResult;

/// Type-erased, shared argument value.
pub type HookArg = Arc<dyn Any + Send + Sync>;

/// Signature of a hook handler.
///
/// Returning `Ok(None)` contributes nothing to the call's result list.
pub type HookFn = Arc<dyn Fn(&HookArgs) -> AppResult<Option<Value>> + Send + Sync>;

/// Keyword arguments passed to a hook call.
#[derive(Clone, Default)]
pub struct HookArgs {
    /// Argument name → value.
    values: HashMap<String, HookArg>,
}

impl HookArgs {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, taking ownership.
    pub fn with<T: Any + Send + Sync>(self, name: &str, value: T) -> Self {
        self.with_shared(name, Arc::new(value))
    }

    /// Inserts an already shared value, e.g. the host application.
    pub fn with_shared<T: Any + Send + Sync>(mut self, name: &str, value: Arc<T>) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    /// Inserts a JSON value.
    pub fn with_json(self, name: &str, value: Value) -> Self {
        self.with(name, value)
    }

    /// Gets a typed argument.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    /// Gets a JSON argument.
    pub fn json(&self, name: &str) -> Option<&Value> {
        self.get::<Value>(name)
    }

    /// Returns whether an argument is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the argument names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no arguments are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builds the subset a handler declared.
    ///
    /// Fails with the first declared name the caller did not pass.
    pub(crate) fn select(&self, argnames: &[String]) -> Result<HookArgs, String> {
        let mut values = HashMap::with_capacity(argnames.len());
        for name in argnames {
            let value = self.values.get(name).ok_or_else(|| name.clone())?;
            values.insert(name.clone(), Arc::clone(value));
        }
        Ok(HookArgs { values })
    }
}

impl fmt::Debug for HookArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("HookArgs").field("names", &names).finish()
    }
}

/// A named handler a plugin offers for one hook.
#[derive(Clone)]
pub struct HookImpl {
    /// Hook this handler implements.
    hook_name: String,
    /// Parameters the handler accepts.
    argnames: Vec<String>,
    /// The handler.
    function: HookFn,
}

impl HookImpl {
    /// Creates a handler for `hook_name` accepting `argnames`.
    pub fn new<F>(hook_name: &str, argnames: &[&str], function: F) -> Self
    where
        F: Fn(&HookArgs) -> AppResult<Option<Value>> + Send + Sync + 'static,
    {
        Self {
            hook_name: hook_name.to_string(),
            argnames: argnames.iter().map(|a| a.to_string()).collect(),
            function: Arc::new(function),
        }
    }

    /// Returns the hook name.
    pub fn hook_name(&self) -> &str {
        &self.hook_name
    }

    /// Returns the declared parameters.
    pub fn argnames(&self) -> &[String] {
        &self.argnames
    }

    /// Returns the handler.
    pub fn function(&self) -> &HookFn {
        &self.function
    }
}

impl fmt::Debug for HookImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookImpl")
            .field("hook_name", &self.hook_name)
            .field("argnames", &self.argnames)
            .field("function", &"<closure>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct App {
        name: &'static str,
    }

    #[test]
    fn test_typed_and_json_args() {
        let args = HookArgs::new()
            .with("app", App { name: "forum" })
            .with_json("context", json!({"user": "admin"}));

        assert_eq!(args.get::<App>("app"), Some(&App { name: "forum" }));
        assert_eq!(args.json("context"), Some(&json!({"user": "admin"})));
        assert!(args.get::<String>("app").is_none());
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_select_declared_subset() {
        let args = HookArgs::new().with("app", 1u8).with("pluggy", 2u8);
        let selected = args.select(&["app".to_string()]).unwrap();
        assert!(selected.contains("app"));
        assert!(!selected.contains("pluggy"));

        let missing = args.select(&["cli".to_string()]).unwrap_err();
        assert_eq!(missing, "cli");
    }
}
