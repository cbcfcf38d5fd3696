//! Search engine client contract.
//!
//! The lifecycle layer never talks to a concrete engine directly; it is
//! handed an implementation of this trait. All methods address physical
//! index names (`<index_name>-<number>`).

use async_trait::async_trait;

use searchmig_types::{Document, SchemaDefinition};

use crate::error::EngineError;

/// Per-document failure from a bulk write.
#[derive(Debug, Clone)]
pub struct BulkFailure {
    /// Document id the engine rejected
    pub doc_id: String,
    /// Engine-reported reason
    pub reason: String,
}

/// Result of a bulk write.
///
/// Per-document rejections come back here rather than as an `Err`; the
/// request itself succeeded.
#[derive(Debug, Clone, Default)]
pub struct BulkResponse {
    /// Documents confirmed written
    pub successes: usize,
    /// Documents the engine rejected
    pub failures: Vec<BulkFailure>,
}

impl BulkResponse {
    /// Create a response with the given number of confirmed writes.
    pub fn ok(successes: usize) -> Self {
        Self {
            successes,
            failures: Vec::new(),
        }
    }

    /// Whether every document in the batch was confirmed.
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Operations the lifecycle layer needs from a search engine.
///
/// Implementations wrap a concrete engine client (Elasticsearch,
/// OpenSearch, a test double). Methods map one-to-one onto engine API
/// calls and do no retrying themselves; the caller owns the retry policy.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Create a physical index with the given schema.
    ///
    /// Returns `IndexExists` when the name is already taken.
    async fn create_index(&self, name: &str, schema: &SchemaDefinition)
        -> Result<(), EngineError>;

    /// Delete a physical index and its documents.
    async fn delete_index(&self, name: &str) -> Result<(), EngineError>;

    /// Delete all documents from a physical index, keeping the index.
    async fn clear_index(&self, name: &str) -> Result<(), EngineError>;

    /// Write a batch of documents, upserting by document id.
    async fn bulk_index(
        &self,
        name: &str,
        documents: &[Document],
    ) -> Result<BulkResponse, EngineError>;

    /// Make recent writes visible to searches and counts.
    async fn refresh(&self, name: &str) -> Result<(), EngineError>;

    /// Number of documents in a physical index.
    async fn count(&self, name: &str) -> Result<u64, EngineError>;
}
