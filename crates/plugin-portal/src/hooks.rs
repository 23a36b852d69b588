//! Hook implementations for the portal plugin.

use serde_json::{Value, json};
use tracing::debug;

use flaskbb_plugin::hookimpl;
use flaskbb_plugin::hooks::HookImpl;

use crate::plugin::PortalSettings;

/// Folder holding the portal's message catalogs.
pub const TRANSLATIONS_DIR: &str = "flaskbb_plugin_portal/translations";

/// `flaskbb_load_blueprints(app)`: describes the portal blueprint.
pub fn load_blueprints(settings: &PortalSettings) -> HookImpl {
    let settings = settings.clone();
    hookimpl!(flaskbb_load_blueprints(app) => move |args| {
        let app_name = args
            .json("app")
            .and_then(|app| app.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("flaskbb");
        debug!(app = %app_name, url_prefix = %settings.url_prefix, "Registering portal blueprint");

        Ok(Some(json!({
            "blueprint": "portal",
            "url_prefix": settings.url_prefix,
            "app": app_name,
            "forum_ids": settings.forum_ids,
            "recent_topics": settings.recent_topics,
        })))
    })
}

/// `flaskbb_load_translations()`: returns the translations folder.
pub fn load_translations() -> HookImpl {
    hookimpl!(flaskbb_load_translations() => |_| Ok(Some(json!(TRANSLATIONS_DIR))))
}

/// `flaskbb_tpl_before_navigation()`: renders the navigation link.
pub fn tpl_before_navigation(settings: &PortalSettings) -> HookImpl {
    let href = settings.url_prefix.clone();
    hookimpl!(flaskbb_tpl_before_navigation() => move |_| {
        Ok(Some(json!(format!(
            "<li><a href=\"{href}\"><i class=\"fa fa-home fa-fw\"></i> Portal</a></li>"
        ))))
    })
}
