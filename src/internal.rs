//! First-party forum modules registered as internal plugins.

use serde_json::json;

use flaskbb_plugin::hookimpl;
use flaskbb_plugin::prelude::*;

/// A forum module contributing its blueprint.
#[derive(Debug, Clone)]
pub struct CoreModule {
    name: &'static str,
    blueprint: Option<(&'static str, &'static str)>,
}

impl Plugin for CoreModule {
    fn canonical_name(&self) -> Option<String> {
        Some(self.name.to_string())
    }

    fn hookimpls(&self) -> Vec<HookImpl> {
        let Some((blueprint, url_prefix)) = self.blueprint else {
            return Vec::new();
        };
        vec![hookimpl!(flaskbb_load_blueprints(app) => move |_| {
            Ok(Some(json!({ "blueprint": blueprint, "url_prefix": url_prefix })))
        })]
    }

    fn package(&self) -> Option<&str> {
        Some("flaskbb")
    }
}

/// The modules every forum instance registers before discovery runs.
pub fn modules() -> Vec<CoreModule> {
    [
        ("flaskbb.forum", Some(("forum", "/"))),
        ("flaskbb.auth", Some(("auth", "/auth"))),
        ("flaskbb.user", Some(("user", "/user"))),
        ("flaskbb.management", Some(("management", "/admin"))),
        ("flaskbb.message", Some(("message", "/message"))),
        ("flaskbb.cli", None),
    ]
    .into_iter()
    .map(|(name, blueprint)| CoreModule { name, blueprint })
    .collect()
}
