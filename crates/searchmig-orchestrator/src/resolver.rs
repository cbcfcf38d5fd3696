//! Schema-driven version materialization.
//!
//! A create request compares the definition's current schema fingerprint
//! against the newest non-retired version and only materializes a new
//! version when they differ. Running create on every deploy is therefore
//! safe; unchanged schemas are a no-op.

use std::sync::Arc;

use tracing::{info, warn};

use searchmig_engine::{with_retry, EngineError, RetryPolicy, SearchEngine};
use searchmig_store::VersionStore;
use searchmig_types::IndexVersion;

use crate::error::OrchestratorError;
use crate::registry::IndexDefinition;

/// Outcome of a create request.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    /// A new version was materialized for a changed schema
    Created(IndexVersion),
    /// The schema is unchanged; the existing version is returned
    Unchanged(IndexVersion),
}

impl CreateOutcome {
    /// The version this outcome refers to, new or reused.
    pub fn version(&self) -> &IndexVersion {
        match self {
            CreateOutcome::Created(v) | CreateOutcome::Unchanged(v) => v,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// Materializes index versions from schema revisions.
pub struct VersionResolver {
    store: Arc<VersionStore>,
    engine: Arc<dyn SearchEngine>,
    retry: RetryPolicy,
}

impl VersionResolver {
    pub fn new(store: Arc<VersionStore>, engine: Arc<dyn SearchEngine>, retry: RetryPolicy) -> Self {
        Self {
            store,
            engine,
            retry,
        }
    }

    /// Ensure a version exists for the definition's current schema.
    ///
    /// Retired versions are ignored when comparing fingerprints but still
    /// count for numbering, so a number is never reused. If the engine
    /// fails to create the physical index, the version record is removed
    /// again so no half-created version lingers.
    pub async fn resolve(
        &self,
        definition: &dyn IndexDefinition,
    ) -> Result<CreateOutcome, OrchestratorError> {
        let name = definition.name();
        let schema = definition.schema();
        let fingerprint = schema.fingerprint();

        let (_, registered) = self.store.register_index(name)?;
        if registered {
            info!(index = %name, "Registered new index");
        }

        let versions = self.store.versions(name)?;
        if let Some(existing) = versions.iter().rev().find(|v| !v.is_retired()) {
            if existing.fingerprint == fingerprint {
                info!(
                    index = %name,
                    version = existing.number,
                    "Schema unchanged, reusing existing version"
                );
                return Ok(CreateOutcome::Unchanged(existing.clone()));
            }
        }

        let number = versions.last().map(|v| v.number + 1).unwrap_or(1);
        let version = IndexVersion::new(name, number, fingerprint);

        self.store.insert_version(&version)?;

        let physical = version.physical_name();
        let created = with_retry(&self.retry, "create_index", || {
            self.engine.create_index(&physical, &schema)
        })
        .await;

        match created {
            Ok(()) => {}
            Err(EngineError::IndexExists(_)) => {
                warn!(
                    index = %name,
                    physical = %physical,
                    "Physical index already exists, adopting it"
                );
            }
            Err(e) => {
                self.store.remove_version(name, version.number)?;
                return Err(e.into());
            }
        }

        info!(
            index = %name,
            version = version.number,
            fingerprint = %version.fingerprint.short(),
            "Created index version"
        );
        Ok(CreateOutcome::Created(version))
    }
}
