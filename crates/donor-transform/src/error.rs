//! Standardization errors.

use polars::prelude::PolarsError;
use thiserror::Error;

/// A batch that cannot be brought into the canonical schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A canonical field is absent from the input.
    #[error("required field '{field}' is missing from the input schema")]
    MissingField { field: String },

    /// A field exists but its column type cannot be coerced.
    #[error("field '{field}' has unconvertible type {dtype}")]
    UnconvertibleType { field: String, dtype: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for SchemaError {
    fn from(err: PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for standardization.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_field() {
        let err = SchemaError::MissingField {
            field: "date_naissance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "required field 'date_naissance' is missing from the input schema"
        );
    }
}
