//! Storage layer error types.

use thiserror::Error;

/// Errors that can occur in the version store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// RocksDB operation failed
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Column family not found
    #[error("Column family not found: {0}")]
    ColumnFamilyNotFound(String),

    /// Key encoding/decoding error
    #[error("Key error: {0}")]
    Key(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Logical index not registered
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Version record not found
    #[error("Version not found: {0} v{1}")]
    VersionNotFound(String, u32),

    /// Version number already taken by a concurrent writer
    #[error("Version already exists: {0} v{1}")]
    VersionExists(String, u32),

    /// Retired versions reject further mutation
    #[error("Version is retired and immutable: {0} v{1}")]
    RetiredImmutable(String, u32),

    /// Action record not found
    #[error("Action not found: sequence {0}")]
    ActionNotFound(u64),

    /// Action already reached a terminal state
    #[error("Action already finished: sequence {0}")]
    ActionFinished(u64),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
