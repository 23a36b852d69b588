//! Hook dispatcher: calls a hook's handlers and collects their results.
//!
//! Handlers run in registration order. [`HookCaller::call`] stops at the
//! first failing handler and returns its error; [`HookCaller::call_lenient`]
//! logs the failure and moves on to the next handler.

use serde_json::Value;
use tracing::{debug, warn};

use super::definitions::HookArgs;
use super::registry::HookEntry;
use super::spec::HookSpec;
use crate::error::{PluginError, PluginResult};

/// Borrowed view of one hook, ready to be called.
#[derive(Debug, Clone, Copy)]
pub struct HookCaller<'a> {
    /// Hook name.
    name: &'a str,
    /// Specification, absent while the hook is only implemented.
    spec: Option<&'a HookSpec>,
    /// Handlers in invocation order.
    entries: &'a [HookEntry],
}

impl<'a> HookCaller<'a> {
    pub(crate) fn new(name: &'a str, spec: Option<&'a HookSpec>, entries: &'a [HookEntry]) -> Self {
        Self {
            name,
            spec,
            entries,
        }
    }

    /// Returns the hook name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns the specification, if declared.
    pub fn spec(&self) -> Option<&'a HookSpec> {
        self.spec
    }

    /// Returns the owning plugin names in invocation order.
    pub fn impl_names(&self) -> Vec<&'a str> {
        self.entries.iter().map(|e| e.plugin_name.as_str()).collect()
    }

    /// Calls every handler; the first error aborts the call.
    pub fn call(&self, args: &HookArgs) -> PluginResult<Vec<Value>> {
        self.log_call(args);

        let mut results = Vec::new();
        for entry in self.entries {
            if let Some(value) = self.call_one(entry, args)? {
                results.push(value);
            }
        }
        Ok(results)
    }

    /// Calls every handler; failing handlers are logged and skipped.
    pub fn call_lenient(&self, args: &HookArgs) -> Vec<Value> {
        self.log_call(args);

        let mut results = Vec::new();
        for entry in self.entries {
            match self.call_one(entry, args) {
                Ok(Some(value)) => results.push(value),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        hook = %self.name,
                        plugin = %entry.plugin_name,
                        error = %e,
                        "Hook handler failed, skipping"
                    );
                }
            }
        }
        results
    }

    fn call_one(&self, entry: &HookEntry, args: &HookArgs) -> PluginResult<Option<Value>> {
        let selected =
            args.select(entry.hookimpl.argnames())
                .map_err(|argument| PluginError::HookCall {
                    hook: self.name.to_string(),
                    plugin: entry.plugin_name.clone(),
                    argument,
                })?;

        (entry.hookimpl.function())(&selected).map_err(|source| PluginError::Handler {
            hook: self.name.to_string(),
            plugin: entry.plugin_name.clone(),
            source,
        })
    }

    fn log_call(&self, args: &HookArgs) {
        if let Some(spec) = self.spec {
            let missing: Vec<&String> =
                spec.argnames.iter().filter(|a| !args.contains(a)).collect();
            if !missing.is_empty() {
                warn!(
                    hook = %self.name,
                    missing = ?missing,
                    "Hook called without arguments declared in its specification"
                );
            }
        }

        debug!(
            hook = %self.name,
            handler_count = self.entries.len(),
            "Dispatching hook"
        );
    }
}

/// Concatenates template hook results into markup.
///
/// String values are used verbatim, anything else as JSON text.
pub fn concat_results(results: &[Value]) -> String {
    results
        .iter()
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::definitions::HookImpl;
    use crate::plugin::{Plugin, PluginHandle};
    use flaskbb_core::error::AppError;
    use serde_json::json;

    #[derive(Debug)]
    struct Dummy;

    impl Plugin for Dummy {}

    fn entry(name: &str, hookimpl: HookImpl) -> HookEntry {
        HookEntry {
            hookimpl,
            plugin_name: name.to_string(),
            plugin_key: PluginHandle::new(Dummy).key(),
        }
    }

    #[test]
    fn test_call_collects_in_order_and_drops_none() {
        let entries = vec![
            entry("first", HookImpl::new("h", &["app"], |_| Ok(Some(json!(1))))),
            entry("silent", HookImpl::new("h", &[], |_| Ok(None))),
            entry("second", HookImpl::new("h", &[], |_| Ok(Some(json!(2))))),
        ];
        let caller = HookCaller::new("h", None, &entries);

        let results = caller.call(&HookArgs::new().with("app", ())).unwrap();
        assert_eq!(results, vec![json!(1), json!(2)]);
        assert_eq!(caller.impl_names(), vec!["first", "silent", "second"]);
    }

    #[test]
    fn test_call_stops_at_first_error() {
        let entries = vec![
            entry(
                "broken",
                HookImpl::new("h", &[], |_| Err(AppError::internal("boom"))),
            ),
            entry("after", HookImpl::new("h", &[], |_| Ok(Some(json!("late"))))),
        ];
        let caller = HookCaller::new("h", None, &entries);

        let err = caller.call(&HookArgs::new()).unwrap_err();
        assert!(matches!(err, PluginError::Handler { ref plugin, .. } if plugin == "broken"));

        let results = caller.call_lenient(&HookArgs::new());
        assert_eq!(results, vec![json!("late")]);
    }

    #[test]
    fn test_missing_declared_argument() {
        let entries = vec![entry("cli-plugin", HookImpl::new("h", &["cli"], |_| Ok(None)))];
        let caller = HookCaller::new("h", None, &entries);

        let err = caller.call(&HookArgs::new()).unwrap_err();
        assert!(matches!(err, PluginError::HookCall { ref argument, .. } if argument == "cli"));
    }

    #[test]
    fn test_handler_sees_only_declared_arguments() {
        let entries = vec![entry(
            "narrow",
            HookImpl::new("h", &["app"], |args| {
                Ok(Some(json!(args.contains("pluggy"))))
            }),
        )];
        let caller = HookCaller::new("h", None, &entries);
        let args = HookArgs::new().with("app", ()).with("pluggy", ());

        assert_eq!(caller.call(&args).unwrap(), vec![json!(false)]);
    }

    #[test]
    fn test_concat_results() {
        let results = vec![json!("<li>Portal</li>"), json!(3)];
        assert_eq!(concat_results(&results), "<li>Portal</li>3");
    }
}
