//! Error types shared by the domain layer.

use thiserror::Error;

/// Errors raised by domain type construction and configuration loading.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Index name failed validation
    #[error("Invalid index name: {0}")]
    InvalidName(String),

    /// Version selector string could not be parsed
    #[error("Invalid version selector: {0}")]
    InvalidSelector(String),
}
