//! Validation errors.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while partitioning a batch.
///
/// Rule violations are never errors; they are counted in reports.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for ValidateError {
    fn from(err: PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidateError>;
