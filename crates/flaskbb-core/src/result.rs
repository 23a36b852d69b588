//! Convenience result type alias for FlaskBB.

use crate::error::AppError;

/// A specialized `Result` type for FlaskBB operations.
pub type AppResult<T> = Result<T, AppError>;
