//! Logging configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const FORMATS: [&str; 2] = ["json", "pretty"];

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"json"` or `"pretty"`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl LoggingConfig {
    /// Check that level and format are recognized.
    pub fn validate(&self) -> Result<(), AppError> {
        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(AppError::validation(format!(
                "logging.level '{}' is not one of {LEVELS:?}",
                self.level
            )));
        }
        if !FORMATS.contains(&self.format.as_str()) {
            return Err(AppError::validation(format!(
                "logging.format '{}' is not one of {FORMATS:?}",
                self.format
            )));
        }
        Ok(())
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}
