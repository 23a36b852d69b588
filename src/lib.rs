//! # flaskbb
//!
//! Forum host: boots the plugin manager the way the forum does at startup
//! and exposes the result to the binaries.

pub mod app;
pub mod internal;

pub use app::{FlaskBB, create_app, plugin_manager, plugin_resolver};
