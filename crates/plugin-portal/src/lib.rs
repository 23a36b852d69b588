//! Portal plugin for FlaskBB.
//!
//! Adds a portal landing page: a blueprint mounted under `/portal`, a
//! navigation link rendered before the main navigation, and translations.

pub mod hooks;
pub mod plugin;

pub use plugin::{ENTRY_POINT, ENTRY_POINT_VALUE, PortalPlugin, PortalSettings, factory};
