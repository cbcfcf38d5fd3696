//! Error types for lifecycle orchestration.

use thiserror::Error;

use searchmig_engine::EngineError;
use searchmig_store::StoreError;
use searchmig_types::TypesError;

/// Coarse classification of a failure, for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request or the registration is wrong; fix it and retry
    Configuration,
    /// The engine, store, or change feed failed; retry later
    ExternalService,
    /// The request would break a lifecycle rule; it was rejected before
    /// any mutation
    InvariantViolation,
    /// Lost a race against a concurrent command on the same index
    Conflict,
}

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No definition registered under this index name
    #[error("no index definition registered for '{0}'")]
    NotRegistered(String),

    /// The command addressed the active version but none is active
    #[error("index '{0}' has no active version; address a version explicitly")]
    NoActiveVersion(String),

    /// The index has no versions at all
    #[error("index '{0}' has no versions; run create first")]
    NoVersions(String),

    /// An explicitly addressed version does not exist
    #[error("version {1} of index '{0}' does not exist")]
    VersionNotFound(String, u32),

    /// Dropping the version that serves reads is rejected
    #[error("version {1} of index '{0}' is active; activate another version before dropping it")]
    DropActive(String, u32),

    /// The addressed version is retired and can no longer be used
    #[error("version {1} of index '{0}' is retired")]
    VersionRetired(String, u32),

    /// The change feed failed while streaming documents
    #[error("change feed for index '{0}' failed: {1}")]
    ChangeFeed(String, String),

    /// The engine rejected individual documents in a bulk write
    #[error("{1} documents rejected while indexing into '{0}'")]
    DocumentsRejected(String, usize),

    /// Invalid index name or selector
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Engine call failed after the retry budget ran out
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Metadata store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrchestratorError {
    /// Classify this error for operator tooling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::NotRegistered(_)
            | OrchestratorError::NoActiveVersion(_)
            | OrchestratorError::Types(_) => ErrorKind::Configuration,

            OrchestratorError::NoVersions(_)
            | OrchestratorError::VersionNotFound(..)
            | OrchestratorError::DropActive(..)
            | OrchestratorError::VersionRetired(..) => ErrorKind::InvariantViolation,

            OrchestratorError::Store(StoreError::VersionExists(..))
            | OrchestratorError::Store(StoreError::ActionFinished(_)) => ErrorKind::Conflict,

            OrchestratorError::Store(StoreError::RetiredImmutable(..)) => {
                ErrorKind::InvariantViolation
            }

            OrchestratorError::ChangeFeed(..)
            | OrchestratorError::DocumentsRejected(..)
            | OrchestratorError::Engine(_)
            | OrchestratorError::Store(_) => ErrorKind::ExternalService,
        }
    }
}
