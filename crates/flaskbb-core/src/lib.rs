//! # flaskbb-core
//!
//! Core crate for FlaskBB. Contains the configuration schemas and the
//! unified error system shared by the plugin subsystem, the host binary
//! and the administration CLI.
//!
//! This crate has **no** internal dependencies on other FlaskBB crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
