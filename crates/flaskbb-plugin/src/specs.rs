//! FlaskBB hook specifications.
//!
//! Every extension point the forum publishes, under the `flaskbb` project
//! tag. Plugins implement any subset of them.

use crate::hooks::spec::{HookSpec, HookSpecs};

/// Project tag of the forum's hook markers.
pub const PROJECT_NAME: &str = "flaskbb";

/// `(hook, parameters)` of every FlaskBB extension point.
const FLASKBB_HOOKS: &[(&str, &[&str])] = &[
    // Setup hooks
    ("flaskbb_extensions", &["app"]),
    ("flaskbb_load_translations", &[]),
    ("flaskbb_load_migrations", &[]),
    ("flaskbb_load_blueprints", &["app"]),
    ("flaskbb_request_processors", &["app"]),
    ("flaskbb_errorhandlers", &["app"]),
    ("flaskbb_jinja_directives", &["app"]),
    ("flaskbb_additional_setup", &["app", "pluggy"]),
    ("flaskbb_cli", &["cli"]),
    // Template hooks
    ("flaskbb_tpl_before_navigation", &[]),
    ("flaskbb_tpl_after_navigation", &["context"]),
    ("flaskbb_tpl_before_registration_form", &["context"]),
    ("flaskbb_tpl_after_registration_form", &["context"]),
    ("flaskbb_tpl_before_user_details_form", &["context"]),
    ("flaskbb_tpl_after_user_details_form", &["context"]),
];

/// The forum's specification container.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlaskBBSpecs;

impl HookSpecs for FlaskBBSpecs {
    fn describe(&self) -> String {
        "flaskbb.plugins.spec".to_string()
    }

    fn specs(&self) -> Vec<HookSpec> {
        FLASKBB_HOOKS
            .iter()
            .map(|(name, args)| HookSpec::new(PROJECT_NAME, name, args))
            .collect()
    }
}
