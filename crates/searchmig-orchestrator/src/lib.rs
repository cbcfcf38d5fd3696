//! Lifecycle orchestration for versioned search indexes.
//!
//! Ties the metadata store, the engine client, and application-provided
//! index definitions together behind one facade:
//! - [`IndexRegistry`] holds the [`IndexDefinition`]s an application registers
//! - [`VersionResolver`] materializes a version per schema revision
//! - [`Reindexer`] streams change-feed documents with a resumable cursor
//! - [`ActivationSwitch`] flips which version serves reads
//! - [`RetirementManager`] drops and clears physical indexes
//! - [`IndexOrchestrator`] wraps each verb in per-index locking and an
//!   append-only audit trail

pub mod activation;
pub mod error;
pub mod locks;
pub mod mock;
pub mod orchestrator;
pub mod registry;
pub mod reindex;
pub mod resolver;
pub mod retire;
pub mod status;

pub use activation::ActivationSwitch;
pub use error::{ErrorKind, OrchestratorError};
pub use locks::IndexLocks;
pub use mock::MockDefinition;
pub use orchestrator::{FanoutReport, IndexOrchestrator};
pub use registry::{DocumentStream, FeedError, IndexDefinition, IndexRegistry};
pub use reindex::{Reindexer, UpdateReport};
pub use resolver::{CreateOutcome, VersionResolver};
pub use retire::RetirementManager;
pub use status::{IndexStatus, VersionRow};
