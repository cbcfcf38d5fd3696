//! Version retirement and clearing.

use std::sync::Arc;

use tracing::{debug, info, warn};

use searchmig_engine::{with_retry, EngineError, RetryPolicy, SearchEngine};
use searchmig_store::VersionStore;
use searchmig_types::{IndexVersion, VersionStatus};

use crate::error::OrchestratorError;

/// Removes physical indexes and marks versions retired.
pub struct RetirementManager {
    store: Arc<VersionStore>,
    engine: Arc<dyn SearchEngine>,
    retry: RetryPolicy,
}

impl RetirementManager {
    pub fn new(store: Arc<VersionStore>, engine: Arc<dyn SearchEngine>, retry: RetryPolicy) -> Self {
        Self {
            store,
            engine,
            retry,
        }
    }

    /// Delete a version's physical index and mark the version retired.
    ///
    /// The active version is protected; deactivate it or activate a
    /// replacement first. Dropping an already-retired version is a
    /// no-op, so a crashed drop can simply be re-run. Retired is
    /// terminal: the record stays visible in history but can never be
    /// updated or activated again, and its number is never reused.
    pub async fn drop_version(
        &self,
        name: &str,
        number: u32,
    ) -> Result<IndexVersion, OrchestratorError> {
        let version = self
            .store
            .get_version(name, number)?
            .ok_or_else(|| OrchestratorError::VersionNotFound(name.to_string(), number))?;

        if version.is_retired() {
            debug!(index = %name, version = number, "Version already retired");
            return Ok(version);
        }
        if version.active {
            return Err(OrchestratorError::DropActive(name.to_string(), number));
        }

        let physical = version.physical_name();
        let deleted = with_retry(&self.retry, "delete_index", || {
            self.engine.delete_index(&physical)
        })
        .await;

        match deleted {
            Ok(()) => {}
            Err(EngineError::IndexNotFound(_)) => {
                warn!(
                    index = %name,
                    physical = %physical,
                    "Physical index already gone, retiring the record anyway"
                );
            }
            Err(e) => return Err(e.into()),
        }

        let retired = self.store.update_version(name, number, |v| {
            v.status = VersionStatus::Retired;
            v.active = false;
            v.doc_count = 0;
            v.cursor = None;
        })?;

        info!(index = %name, version = number, "Dropped version");
        Ok(retired)
    }

    /// Empty a version's physical index, keeping the version usable.
    ///
    /// The cursor is reset along with the doc count, so the next update
    /// pass of either mode replays the complete document set. Clearing
    /// the active version is allowed but searches return nothing until
    /// that replay happens.
    pub async fn clear_version(
        &self,
        name: &str,
        number: u32,
    ) -> Result<IndexVersion, OrchestratorError> {
        let version = self
            .store
            .get_version(name, number)?
            .ok_or_else(|| OrchestratorError::VersionNotFound(name.to_string(), number))?;

        if version.is_retired() {
            return Err(OrchestratorError::VersionRetired(name.to_string(), number));
        }
        if version.active {
            warn!(
                index = %name,
                version = number,
                "Clearing the ACTIVE version; searches return nothing until it is reindexed"
            );
        }

        let physical = version.physical_name();
        with_retry(&self.retry, "clear_index", || {
            self.engine.clear_index(&physical)
        })
        .await?;

        let cleared = self.store.update_version(name, number, |v| {
            v.cursor = None;
            v.doc_count = 0;
        })?;

        info!(index = %name, version = number, "Cleared version");
        Ok(cleared)
    }
}
