//! Operator facade tying the lifecycle components together.
//!
//! Every verb follows the same shape: acquire the per-index lock, append
//! a `Running` action to the audit log, run the effect, finish the
//! action with the outcome, and return it. Fan-out verbs iterate the
//! registry and isolate per-index failures so one broken index never
//! blocks the rest.

use std::sync::Arc;

use tracing::{error, info, warn};

use searchmig_engine::{RetryPolicy, SearchEngine};
use searchmig_store::VersionStore;
use searchmig_types::{
    ActionKind, ActionStatus, IndexAction, IndexVersion, ReindexSettings, UpdateMode,
    VersionSelector,
};

use crate::activation::ActivationSwitch;
use crate::error::OrchestratorError;
use crate::locks::IndexLocks;
use crate::registry::{IndexDefinition, IndexRegistry};
use crate::reindex::{Reindexer, UpdateReport};
use crate::resolver::{CreateOutcome, VersionResolver};
use crate::retire::RetirementManager;
use crate::status::{IndexStatus, VersionRow};

/// Per-index outcome of a fan-out verb.
#[derive(Debug, Default)]
pub struct FanoutReport {
    /// Indexes that completed
    pub applied: Vec<String>,
    /// Indexes that failed, with the error each one hit
    pub failures: Vec<(String, OrchestratorError)>,
}

impl FanoutReport {
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Entry point for lifecycle commands on versioned search indexes.
pub struct IndexOrchestrator {
    registry: IndexRegistry,
    store: Arc<VersionStore>,
    engine: Arc<dyn SearchEngine>,
    resolver: VersionResolver,
    reindexer: Reindexer,
    activation: ActivationSwitch,
    retirement: RetirementManager,
    locks: IndexLocks,
}

impl IndexOrchestrator {
    pub fn new(
        registry: IndexRegistry,
        store: Arc<VersionStore>,
        engine: Arc<dyn SearchEngine>,
        settings: &ReindexSettings,
    ) -> Self {
        let retry = RetryPolicy::from_settings(settings);
        Self {
            resolver: VersionResolver::new(store.clone(), engine.clone(), retry.clone()),
            reindexer: Reindexer::new(
                store.clone(),
                engine.clone(),
                retry.clone(),
                settings.batch_size,
            ),
            activation: ActivationSwitch::new(store.clone()),
            retirement: RetirementManager::new(store.clone(), engine.clone(), retry),
            locks: IndexLocks::new(),
            registry,
            store,
            engine,
        }
    }

    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    /// Ensure a version exists for the definition's current schema.
    ///
    /// Safe to run on every deploy: an unchanged schema is a no-op.
    pub async fn create(&self, name: &str) -> Result<CreateOutcome, OrchestratorError> {
        let definition = self.registry.get(name)?;
        let _guard = self.locks.acquire(name).await;
        self.create_locked(definition.as_ref()).await
    }

    /// Run a reindex pass against the selected version.
    ///
    /// Callers that do not care about versions pass
    /// `VersionSelector::Active`; if nothing is active that is a
    /// configuration error, not a silent fallback.
    pub async fn update(
        &self,
        name: &str,
        selector: VersionSelector,
        mode: UpdateMode,
    ) -> Result<UpdateReport, OrchestratorError> {
        let definition = self.registry.get(name)?;
        let _guard = self.locks.acquire(name).await;
        self.update_locked(definition.as_ref(), selector, mode).await
    }

    /// Point reads of the logical name at the selected version.
    pub async fn activate(
        &self,
        name: &str,
        selector: VersionSelector,
    ) -> Result<IndexVersion, OrchestratorError> {
        self.registry.get(name)?;
        let _guard = self.locks.acquire(name).await;
        self.activate_locked(name, selector).await
    }

    /// Clear the selected version's active flag.
    pub async fn deactivate(
        &self,
        name: &str,
        selector: VersionSelector,
    ) -> Result<IndexVersion, OrchestratorError> {
        self.registry.get(name)?;
        let _guard = self.locks.acquire(name).await;

        let mut begin = IndexAction::begin(name, ActionKind::Deactivate);
        if let VersionSelector::Number(number) = selector {
            begin = begin.with_version(number);
        }
        let action = self.store.append_action(&begin)?;

        let result = self.activation.deactivate(name, selector);
        self.record(action.sequence, &result, 0)?;
        result
    }

    /// Delete a version's physical index and retire the record.
    ///
    /// Takes an explicit number rather than a selector; destroying data
    /// should never happen through an indirection.
    pub async fn drop_version(
        &self,
        name: &str,
        number: u32,
    ) -> Result<IndexVersion, OrchestratorError> {
        self.registry.get(name)?;
        let _guard = self.locks.acquire(name).await;

        let action = self
            .store
            .append_action(&IndexAction::begin(name, ActionKind::Drop).with_version(number))?;

        let result = self.retirement.drop_version(name, number).await;
        self.record(action.sequence, &result, 0)?;
        result
    }

    /// Empty the selected version's physical index, keeping the version.
    pub async fn clear_version(
        &self,
        name: &str,
        selector: VersionSelector,
    ) -> Result<IndexVersion, OrchestratorError> {
        self.registry.get(name)?;
        let _guard = self.locks.acquire(name).await;

        let mut begin = IndexAction::begin(name, ActionKind::Clear);
        if let VersionSelector::Number(number) = selector {
            begin = begin.with_version(number);
        }
        let action = self.store.append_action(&begin)?;

        let result = match self.activation.resolve_target(name, selector) {
            Ok(target) => self.retirement.clear_version(name, target.number).await,
            Err(e) => Err(e),
        };
        self.record(action.sequence, &result, 0)?;
        result
    }

    /// Prepare every registered index for a deploy.
    ///
    /// Per index: create a version for the current schema if one is
    /// missing, then run an incremental pass against it. Activation is
    /// left alone; flipping reads is a separate, deliberate step.
    pub async fn predeploy(&self) -> FanoutReport {
        let mut report = FanoutReport::default();
        for name in self.registry.names() {
            match self.predeploy_index(&name).await {
                Ok(()) => report.applied.push(name),
                Err(e) => {
                    error!(index = %name, error = %e, "Predeploy failed, continuing with remaining indexes");
                    report.failures.push((name, e));
                }
            }
        }
        info!(
            applied = report.applied.len(),
            failed = report.failures.len(),
            "Predeploy finished"
        );
        report
    }

    /// Activate the newest non-retired version of every registered index.
    pub async fn activate_all_latest(&self) -> FanoutReport {
        let mut report = FanoutReport::default();
        for name in self.registry.names() {
            let _guard = self.locks.acquire(&name).await;
            match self.activate_locked(&name, VersionSelector::Latest).await {
                Ok(_) => report.applied.push(name),
                Err(e) => {
                    error!(index = %name, error = %e, "Activation failed, continuing with remaining indexes");
                    report.failures.push((name, e));
                }
            }
        }
        report
    }

    /// Drop every version of every registered index and rebuild from the
    /// current schemas, activating the fresh versions.
    ///
    /// Destroys all indexed data. Meant for development and test
    /// environments, never for production.
    pub async fn dangerous_reset(&self) -> FanoutReport {
        warn!("DANGEROUS RESET: dropping and rebuilding every registered index");
        let mut report = FanoutReport::default();
        for name in self.registry.names() {
            match self.reset_index(&name).await {
                Ok(()) => report.applied.push(name),
                Err(e) => {
                    error!(index = %name, error = %e, "Reset failed, continuing with remaining indexes");
                    report.failures.push((name, e));
                }
            }
        }
        report
    }

    /// Snapshot of every known index and all of its versions.
    ///
    /// With `refresh_counts` the doc count of each non-retired version
    /// is fetched live from the engine; count failures degrade to the
    /// stored value rather than failing the listing.
    pub async fn list_status(
        &self,
        refresh_counts: bool,
    ) -> Result<Vec<IndexStatus>, OrchestratorError> {
        let mut statuses = Vec::new();
        for index in self.store.list_indexes()? {
            let mut rows = Vec::new();
            for version in self.store.versions(&index.name)? {
                let mut row = VersionRow::from(version.clone());
                if refresh_counts && !version.is_retired() {
                    match self.engine.count(&version.physical_name()).await {
                        Ok(count) => row.doc_count = count,
                        Err(e) => warn!(
                            index = %index.name,
                            version = version.number,
                            error = %e,
                            "Live doc count unavailable, using stored value"
                        ),
                    }
                }
                rows.push(row);
            }
            statuses.push(IndexStatus {
                name: index.name,
                versions: rows,
            });
        }
        Ok(statuses)
    }

    /// The most recent `limit` audit records for an index, oldest first.
    pub fn action_history(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<IndexAction>, OrchestratorError> {
        Ok(self.store.actions_for_index(name, limit)?)
    }

    async fn create_locked(
        &self,
        definition: &dyn IndexDefinition,
    ) -> Result<CreateOutcome, OrchestratorError> {
        let action = self
            .store
            .append_action(&IndexAction::begin(definition.name(), ActionKind::Create))?;

        let result = self.resolver.resolve(definition).await;
        self.record(action.sequence, &result, 0)?;
        result
    }

    async fn update_locked(
        &self,
        definition: &dyn IndexDefinition,
        selector: VersionSelector,
        mode: UpdateMode,
    ) -> Result<UpdateReport, OrchestratorError> {
        let name = definition.name();

        let mut begin = IndexAction::begin(name, ActionKind::Update).with_mode(mode);
        if let VersionSelector::Number(number) = selector {
            begin = begin.with_version(number);
        }
        let action = self.store.append_action(&begin)?;

        let result = match self.activation.resolve_target(name, selector) {
            Ok(version) => self.reindexer.update(definition, &version, mode).await,
            Err(e) => Err(e),
        };

        let docs = result.as_ref().map(|r| r.docs_indexed).unwrap_or(0);
        self.record(action.sequence, &result, docs)?;
        result
    }

    async fn activate_locked(
        &self,
        name: &str,
        selector: VersionSelector,
    ) -> Result<IndexVersion, OrchestratorError> {
        let mut begin = IndexAction::begin(name, ActionKind::Activate);
        if let VersionSelector::Number(number) = selector {
            begin = begin.with_version(number);
        }
        let action = self.store.append_action(&begin)?;

        let result = self.activation.activate(name, selector);
        self.record(action.sequence, &result, 0)?;
        result
    }

    async fn predeploy_index(&self, name: &str) -> Result<(), OrchestratorError> {
        let definition = self.registry.get(name)?;
        let _guard = self.locks.acquire(name).await;

        let action = self
            .store
            .append_action(&IndexAction::begin(name, ActionKind::Predeploy))?;

        let result = self.predeploy_effect(definition.as_ref()).await;
        let docs = result.as_ref().map(|r| r.docs_indexed).unwrap_or(0);
        self.record(action.sequence, &result, docs)?;
        result.map(|_| ())
    }

    async fn predeploy_effect(
        &self,
        definition: &dyn IndexDefinition,
    ) -> Result<UpdateReport, OrchestratorError> {
        let outcome = self.resolver.resolve(definition).await?;
        self.reindexer
            .update(definition, outcome.version(), UpdateMode::Incremental)
            .await
    }

    async fn reset_index(&self, name: &str) -> Result<(), OrchestratorError> {
        let definition = self.registry.get(name)?;
        let _guard = self.locks.acquire(name).await;

        let action = self
            .store
            .append_action(&IndexAction::begin(name, ActionKind::Reset))?;

        let result = self.reset_effect(definition.as_ref()).await;
        self.record(action.sequence, &result, 0)?;
        result
    }

    async fn reset_effect(&self, definition: &dyn IndexDefinition) -> Result<(), OrchestratorError> {
        let name = definition.name();

        if self.store.get_index(name)?.is_some() {
            if let Some(active) = self.store.active_version(name)? {
                self.store.deactivate_version(name, active.number)?;
            }
            for version in self.store.versions(name)? {
                if !version.is_retired() {
                    self.retirement.drop_version(name, version.number).await?;
                }
            }
        }

        let outcome = self.resolver.resolve(definition).await?;
        self.store.activate_version(name, outcome.version().number)?;
        Ok(())
    }

    /// Finish an audit record with the result of its effect.
    fn record<T>(
        &self,
        sequence: u64,
        result: &Result<T, OrchestratorError>,
        docs_indexed: u64,
    ) -> Result<(), OrchestratorError> {
        match result {
            Ok(_) => {
                self.store
                    .finish_action(sequence, ActionStatus::Succeeded, None, docs_indexed)?
            }
            Err(e) => self.store.finish_action(
                sequence,
                ActionStatus::Failed,
                Some(e.to_string()),
                docs_indexed,
            )?,
        };
        Ok(())
    }
}
