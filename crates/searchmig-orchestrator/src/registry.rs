//! Index definitions and the registry that holds them.
//!
//! An [`IndexDefinition`] is the application's side of the contract: it
//! names an index, supplies its current schema, and streams documents
//! from the application's change feed. Everything else (versioning,
//! physical indexes, activation) belongs to the lifecycle layer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use thiserror::Error;

use searchmig_types::{validate_index_name, Document, SchemaDefinition};

use crate::error::OrchestratorError;

/// Error raised by an application change feed.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct FeedError(String);

impl FeedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Finite stream of changed documents, ascending by `updated_at`.
pub type DocumentStream = BoxStream<'static, Result<Document, FeedError>>;

/// Application-provided description of one searchable index.
///
/// Implementations are registered once at startup and shared across
/// commands; they must be cheap to call repeatedly.
#[async_trait]
pub trait IndexDefinition: Send + Sync {
    /// Logical index name. Must satisfy [`validate_index_name`].
    fn name(&self) -> &str;

    /// The schema the application currently wants for this index.
    fn schema(&self) -> SchemaDefinition;

    /// Stream documents changed at or after `since`, oldest first.
    ///
    /// `None` asks for the complete document set. The boundary is
    /// inclusive: a document whose `updated_at` equals `since` must be
    /// yielded again. Re-delivery is harmless because bulk writes upsert
    /// by document id. The stream must be finite and restartable.
    async fn changed_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<DocumentStream, FeedError>;
}

/// Registry of index definitions keyed by logical name.
///
/// Built once at startup, then handed to the orchestrator. Names are
/// validated at registration so later commands can trust them.
#[derive(Default)]
pub struct IndexRegistry {
    definitions: HashMap<String, Arc<dyn IndexDefinition>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous one with the same name.
    pub fn register(
        &mut self,
        definition: Arc<dyn IndexDefinition>,
    ) -> Result<(), OrchestratorError> {
        validate_index_name(definition.name())?;
        self.definitions
            .insert(definition.name().to_string(), definition);
        Ok(())
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn IndexDefinition>, OrchestratorError> {
        self.definitions
            .get(name)
            .cloned()
            .ok_or_else(|| OrchestratorError::NotRegistered(name.to_string()))
    }

    /// All registered names, sorted for stable iteration.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
