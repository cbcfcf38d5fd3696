//! Activation switches and version selection.

use std::sync::Arc;

use searchmig_store::VersionStore;
use searchmig_types::{IndexVersion, VersionSelector};

use crate::error::OrchestratorError;

/// Resolves selectors and flips the active version of an index.
///
/// The store applies the actual switch atomically, so readers never see
/// zero or two active versions while an activation is in flight.
pub struct ActivationSwitch {
    store: Arc<VersionStore>,
}

impl ActivationSwitch {
    pub fn new(store: Arc<VersionStore>) -> Self {
        Self { store }
    }

    /// Resolve a selector against the stored versions of an index.
    ///
    /// `Latest` means the highest-numbered non-retired version; retired
    /// versions are history, not candidates.
    pub fn resolve_target(
        &self,
        name: &str,
        selector: VersionSelector,
    ) -> Result<IndexVersion, OrchestratorError> {
        let versions = self.store.versions(name)?;
        if versions.is_empty() {
            return Err(OrchestratorError::NoVersions(name.to_string()));
        }

        match selector {
            VersionSelector::Active => versions
                .into_iter()
                .find(|v| v.active)
                .ok_or_else(|| OrchestratorError::NoActiveVersion(name.to_string())),
            VersionSelector::Latest => versions
                .into_iter()
                .rev()
                .find(|v| !v.is_retired())
                .ok_or_else(|| OrchestratorError::NoVersions(name.to_string())),
            VersionSelector::Number(number) => versions
                .into_iter()
                .find(|v| v.number == number)
                .ok_or_else(|| OrchestratorError::VersionNotFound(name.to_string(), number)),
        }
    }

    /// Make the selected version the one reads resolve to.
    ///
    /// Activating the already-active version is a no-op. A `Created`
    /// version may be activated before its first update; it goes `Live`
    /// empty, which is how a brand-new deployment starts serving.
    pub fn activate(
        &self,
        name: &str,
        selector: VersionSelector,
    ) -> Result<IndexVersion, OrchestratorError> {
        let target = self.resolve_target(name, selector)?;
        if target.is_retired() {
            return Err(OrchestratorError::VersionRetired(
                name.to_string(),
                target.number,
            ));
        }
        Ok(self.store.activate_version(name, target.number)?)
    }

    /// Clear the selected version's active flag, leaving no active version.
    pub fn deactivate(
        &self,
        name: &str,
        selector: VersionSelector,
    ) -> Result<IndexVersion, OrchestratorError> {
        let target = self.resolve_target(name, selector)?;
        Ok(self.store.deactivate_version(name, target.number)?)
    }
}
