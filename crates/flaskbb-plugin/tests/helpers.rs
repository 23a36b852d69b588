//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::json;

use flaskbb_plugin::prelude::*;

/// Plugin without hook implementations.
#[derive(Debug)]
pub struct Blank;

impl Plugin for Blank {}

/// Plugin contributing a navigation link and a blueprint.
#[derive(Debug)]
pub struct Portal;

impl Plugin for Portal {
    fn hookimpls(&self) -> Vec<HookImpl> {
        vec![
            hookimpl!(flaskbb_tpl_before_navigation() => |_| {
                Ok(Some(json!("<a href=\"/portal\">Portal</a>")))
            }),
            hookimpl!(flaskbb_load_blueprints(app) => |args| {
                Ok(args.get::<String>("app").map(|app| json!({ "app": app, "blueprint": "portal" })))
            }),
        ]
    }
}

/// Plugin rendering a notice under the registration form from its context.
#[derive(Debug)]
pub struct Signup;

impl Plugin for Signup {
    fn hookimpls(&self) -> Vec<HookImpl> {
        vec![hookimpl!(flaskbb_tpl_after_registration_form(context) => |args| {
            Ok(args
                .get::<String>("context")
                .map(|form| json!(format!("<p>Terms apply to {form}</p>"))))
        })]
    }
}

/// Plugin whose handler always fails.
#[derive(Debug)]
pub struct Faulty;

impl Plugin for Faulty {
    fn hookimpls(&self) -> Vec<HookImpl> {
        vec![hookimpl!(flaskbb_tpl_before_navigation() => |_| {
            Err(AppError::internal("template exploded"))
        })]
    }
}

/// A manager with the FlaskBB specifications added.
pub fn manager() -> PluginManager {
    let mut pm = PluginManager::new("flaskbb");
    pm.add_hookspecs(&FlaskBBSpecs)
        .expect("FlaskBB specs must be accepted");
    pm
}

/// Writes a `*.dist-info` folder with the given METADATA and entry points.
pub fn write_dist_info(root: &Path, dir_name: &str, metadata: &str, entry_points: &str) {
    let dir = root.join(dir_name);
    fs::create_dir_all(&dir).expect("Failed to create dist-info dir");
    fs::write(dir.join("METADATA"), metadata).expect("Failed to write METADATA");
    if !entry_points.is_empty() {
        fs::write(dir.join("entry_points.txt"), entry_points)
            .expect("Failed to write entry_points.txt");
    }
}
