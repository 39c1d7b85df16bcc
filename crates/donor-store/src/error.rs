//! Store and configuration errors.

use thiserror::Error;

/// Boxed cause of a connectivity failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Mandatory setting unset or unparseable.
    #[error("configuration error for {key}: {message}")]
    Configuration { key: String, message: String },

    /// Store or export target could not be reached or written.
    #[error("cannot reach {target}")]
    Connectivity {
        target: String,
        #[source]
        source: BoxError,
    },

    /// Relation has never been written.
    #[error("relation {relation} does not exist (expected at {location})")]
    RelationNotFound { relation: String, location: String },
}

impl StoreError {
    pub(crate) fn configuration(key: &str, message: impl Into<String>) -> Self {
        StoreError::Configuration {
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn connectivity(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StoreError::Connectivity {
            target: target.into(),
            source: source.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
