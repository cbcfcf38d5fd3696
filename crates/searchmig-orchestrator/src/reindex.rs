//! Resumable reindex passes.
//!
//! A pass streams documents from the definition's change feed into the
//! version's physical index in batches. The version's cursor records the
//! newest `updated_at` the engine has confirmed, and it only moves after
//! confirmation, so an interrupted pass can resume from the last durable
//! point instead of starting over.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tracing::{debug, info, warn};

use searchmig_engine::{with_retry, RetryPolicy, SearchEngine};
use searchmig_store::VersionStore;
use searchmig_types::{Document, IndexVersion, UpdateMode, VersionStatus};

use crate::error::OrchestratorError;
use crate::registry::IndexDefinition;

/// Outcome of one successful reindex pass.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub index_name: String,
    pub version_number: u32,
    pub mode: UpdateMode,
    /// Documents the engine confirmed during this pass
    pub docs_indexed: u64,
    /// Batches the engine confirmed during this pass
    pub batches: u64,
    /// Total documents in the physical index after the pass
    pub doc_count: u64,
}

/// Streams change-feed documents into physical indexes.
pub struct Reindexer {
    store: Arc<VersionStore>,
    engine: Arc<dyn SearchEngine>,
    retry: RetryPolicy,
    batch_size: usize,
}

impl Reindexer {
    pub fn new(
        store: Arc<VersionStore>,
        engine: Arc<dyn SearchEngine>,
        retry: RetryPolicy,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            engine,
            retry,
            batch_size,
        }
    }

    /// Run one reindex pass against a version.
    ///
    /// `Incremental` requests documents changed since the version's
    /// cursor; a version with no cursor gets the complete set, so the
    /// first incremental pass of a fresh version is a full build.
    /// `Full` always requests the complete set and leaves the cursor
    /// alone until the pass succeeds.
    ///
    /// On success the cursor is set to the pass start time, the doc
    /// count is refreshed from the engine, and the version goes `Live`.
    /// On failure the version stays `Reindexing` with the cursor at the
    /// last confirmed batch; a later pass resumes from there.
    pub async fn update(
        &self,
        definition: &dyn IndexDefinition,
        version: &IndexVersion,
        mode: UpdateMode,
    ) -> Result<UpdateReport, OrchestratorError> {
        let name = definition.name();
        let number = version.number;

        if version.is_retired() {
            return Err(OrchestratorError::VersionRetired(name.to_string(), number));
        }

        let pass_started = Utc::now();
        let since = match mode {
            UpdateMode::Incremental => version.cursor,
            UpdateMode::Full => None,
        };

        self.store
            .update_version(name, number, |v| v.status = VersionStatus::Reindexing)?;

        info!(
            index = %name,
            version = number,
            mode = %mode,
            since = ?since,
            "Starting reindex pass"
        );

        let physical = version.physical_name();
        let stream = definition
            .changed_since(since)
            .await
            .map_err(|e| OrchestratorError::ChangeFeed(name.to_string(), e.to_string()))?;
        let mut batched = stream.chunks(self.batch_size);

        let mut docs_indexed = 0u64;
        let mut batches = 0u64;

        while let Some(chunk) = batched.next().await {
            let batch: Vec<Document> = chunk
                .into_iter()
                .collect::<Result<_, _>>()
                .map_err(|e| OrchestratorError::ChangeFeed(name.to_string(), e.to_string()))?;

            if batch.is_empty() {
                continue;
            }

            let response = with_retry(&self.retry, "bulk_index", || {
                self.engine.bulk_index(&physical, &batch)
            })
            .await?;

            if !response.all_ok() {
                warn!(
                    index = %name,
                    version = number,
                    rejected = response.failures.len(),
                    first_id = %response.failures[0].doc_id,
                    first_reason = %response.failures[0].reason,
                    "Engine rejected documents in bulk write"
                );
                return Err(OrchestratorError::DocumentsRejected(
                    name.to_string(),
                    response.failures.len(),
                ));
            }

            docs_indexed += response.successes as u64;
            batches += 1;

            // The cursor moves only after the engine confirmed the batch
            if mode == UpdateMode::Incremental {
                if let Some(high) = batch.iter().map(|d| d.updated_at).max() {
                    self.store
                        .update_version(name, number, |v| v.cursor = Some(high))?;
                }
            }

            debug!(
                index = %name,
                version = number,
                batch = batches,
                docs = docs_indexed,
                "Batch confirmed"
            );
        }

        with_retry(&self.retry, "refresh", || self.engine.refresh(&physical)).await?;
        let doc_count = with_retry(&self.retry, "count", || self.engine.count(&physical)).await?;

        self.store.update_version(name, number, |v| {
            v.cursor = Some(pass_started);
            v.doc_count = doc_count;
            v.status = VersionStatus::Live;
        })?;

        info!(
            index = %name,
            version = number,
            docs = docs_indexed,
            total = doc_count,
            "Reindex pass complete"
        );

        Ok(UpdateReport {
            index_name: name.to_string(),
            version_number: number,
            mode,
            docs_indexed,
            batches,
            doc_count,
        })
    }
}
