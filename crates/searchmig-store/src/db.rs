//! RocksDB wrapper for index lifecycle metadata.
//!
//! Provides:
//! - Database open/close with column family setup
//! - Index and version records with an atomic activation switch
//! - Version-number collision detection on insert
//! - Append-only action log with a monotonic sequence

use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use crate::column_families::{
    build_cf_descriptors, ALL_CF_NAMES, CF_ACTIONS, CF_ACTION_INDEX, CF_INDEXES, CF_VERSIONS,
};
use crate::error::StoreError;
use crate::keys::{ActionIndexKey, ActionKey, IndexKey, VersionKey};
use searchmig_types::{ActionStatus, Index, IndexAction, IndexVersion, VersionStatus};

/// Durable store for indexes, versions, and the action log.
///
/// The store is the single source of truth for lifecycle state. All
/// multi-record transitions (the activation switch, action appends) go
/// through a `WriteBatch` so no intermediate state is ever observable.
pub struct VersionStore {
    db: DB,
    /// Action sequence counter for monotonic ordering
    action_sequence: AtomicU64,
}

impl VersionStore {
    /// Open the store at the given path, creating it if necessary.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        info!("Opening version store at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(4);

        let cf_descriptors = build_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        let action_sequence = Self::load_action_sequence(&db)?;

        Ok(Self {
            db,
            action_sequence: AtomicU64::new(action_sequence),
        })
    }

    /// Load the next action sequence number from storage.
    fn load_action_sequence(db: &DB) -> Result<u64, StoreError> {
        let cf = db
            .cf_handle(CF_ACTIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_ACTIONS.to_string()))?;

        // Iterate in reverse to find the highest key
        let mut iter = db.iterator_cf(&cf, IteratorMode::End);
        if let Some(result) = iter.next() {
            let (key, _) = result?;
            let action_key = ActionKey::from_bytes(&key)?;
            return Ok(action_key.sequence + 1);
        }
        Ok(0)
    }

    /// Get the next action sequence number.
    fn next_action_sequence(&self) -> u64 {
        self.action_sequence.fetch_add(1, Ordering::SeqCst)
    }

    // ==================== Index Methods ====================

    /// Register a logical index, returning the stored record.
    ///
    /// Returns (index, created) where created=false if the index was
    /// already registered; registration is idempotent.
    pub fn register_index(&self, name: &str) -> Result<(Index, bool), StoreError> {
        let cf = self
            .db
            .cf_handle(CF_INDEXES)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_INDEXES.to_string()))?;

        let key = IndexKey::new(name);
        if let Some(bytes) = self.db.get_cf(&cf, key.to_bytes())? {
            debug!("Index {} already registered, skipping", name);
            let existing = Index::from_bytes(&bytes)?;
            return Ok((existing, false));
        }

        let index = Index::new(name);
        self.db.put_cf(&cf, key.to_bytes(), index.to_bytes()?)?;
        info!(index = %name, "Registered index");

        Ok((index, true))
    }

    /// Get a logical index record by name.
    pub fn get_index(&self, name: &str) -> Result<Option<Index>, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_INDEXES)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_INDEXES.to_string()))?;

        match self.db.get_cf(&cf, IndexKey::new(name).to_bytes())? {
            Some(bytes) => Ok(Some(Index::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// List all registered indexes in name order.
    pub fn list_indexes(&self) -> Result<Vec<Index>, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_INDEXES)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_INDEXES.to_string()))?;

        let mut indexes = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);
        for item in iter {
            let (_, value) = item?;
            indexes.push(Index::from_bytes(&value)?);
        }
        Ok(indexes)
    }

    // ==================== Version Methods ====================

    /// Insert a fresh version record.
    ///
    /// Fails with `VersionExists` when the number is already taken. The
    /// per-index serialization in the orchestrator normally prevents this;
    /// the check is the store-level backstop against a bypassed lock.
    pub fn insert_version(&self, version: &IndexVersion) -> Result<(), StoreError> {
        if self.get_index(&version.index_name)?.is_none() {
            return Err(StoreError::IndexNotFound(version.index_name.clone()));
        }

        let cf = self
            .db
            .cf_handle(CF_VERSIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_VERSIONS.to_string()))?;

        let key = VersionKey::new(&version.index_name, version.number);
        if self.db.get_cf(&cf, key.to_bytes())?.is_some() {
            return Err(StoreError::VersionExists(
                version.index_name.clone(),
                version.number,
            ));
        }

        self.db.put_cf(&cf, key.to_bytes(), version.to_bytes()?)?;
        debug!(
            index = %version.index_name,
            version = version.number,
            "Inserted version record"
        );
        Ok(())
    }

    /// Get one version record.
    pub fn get_version(&self, name: &str, number: u32) -> Result<Option<IndexVersion>, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_VERSIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_VERSIONS.to_string()))?;

        match self
            .db
            .get_cf(&cf, VersionKey::new(name, number).to_bytes())?
        {
            Some(bytes) => Ok(Some(IndexVersion::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get all versions of an index in ascending number order.
    pub fn versions(&self, name: &str) -> Result<Vec<IndexVersion>, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_VERSIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_VERSIONS.to_string()))?;

        let prefix = VersionKey::prefix(name);
        let mut versions = Vec::new();

        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            // Stop once past this index's prefix
            if !key.starts_with(&prefix) {
                break;
            }
            versions.push(IndexVersion::from_bytes(&value)?);
        }

        Ok(versions)
    }

    /// Get the currently active version of an index, if any.
    pub fn active_version(&self, name: &str) -> Result<Option<IndexVersion>, StoreError> {
        Ok(self.versions(name)?.into_iter().find(|v| v.active))
    }

    /// Apply a mutation to a version record and persist it.
    ///
    /// Retired versions are immutable; any attempt to mutate one fails
    /// before the closure runs.
    pub fn update_version(
        &self,
        name: &str,
        number: u32,
        mutate: impl FnOnce(&mut IndexVersion),
    ) -> Result<IndexVersion, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_VERSIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_VERSIONS.to_string()))?;

        let key = VersionKey::new(name, number);
        let mut version = match self.db.get_cf(&cf, key.to_bytes())? {
            Some(bytes) => IndexVersion::from_bytes(&bytes)?,
            None => return Err(StoreError::VersionNotFound(name.to_string(), number)),
        };

        if version.is_retired() {
            return Err(StoreError::RetiredImmutable(name.to_string(), number));
        }

        mutate(&mut version);
        self.db.put_cf(&cf, key.to_bytes(), version.to_bytes()?)?;
        Ok(version)
    }

    /// Atomically make one version the active version of its index.
    ///
    /// Clears the previous active flag and sets the target to active and
    /// `Live` in a single write batch, so readers never observe zero or
    /// two active versions. Activating the already-active version is a
    /// no-op.
    pub fn activate_version(&self, name: &str, number: u32) -> Result<IndexVersion, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_VERSIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_VERSIONS.to_string()))?;

        let key = VersionKey::new(name, number);
        let mut target = match self.db.get_cf(&cf, key.to_bytes())? {
            Some(bytes) => IndexVersion::from_bytes(&bytes)?,
            None => return Err(StoreError::VersionNotFound(name.to_string(), number)),
        };

        if target.is_retired() {
            return Err(StoreError::RetiredImmutable(name.to_string(), number));
        }
        if target.active {
            debug!(index = %name, version = number, "Version already active");
            return Ok(target);
        }

        let previous = self.active_version(name)?;

        let mut batch = WriteBatch::default();
        if let Some(mut prev) = previous {
            prev.active = false;
            let prev_key = VersionKey::new(&prev.index_name, prev.number);
            batch.put_cf(&cf, prev_key.to_bytes(), prev.to_bytes()?);
        }

        target.active = true;
        target.status = VersionStatus::Live;
        batch.put_cf(&cf, key.to_bytes(), target.to_bytes()?);

        self.db.write(batch)?;
        info!(index = %name, version = number, "Activated version");

        Ok(target)
    }

    /// Clear the active flag of a version without retiring it.
    ///
    /// No-op when the version is not active.
    pub fn deactivate_version(&self, name: &str, number: u32) -> Result<IndexVersion, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_VERSIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_VERSIONS.to_string()))?;

        let key = VersionKey::new(name, number);
        let mut version = match self.db.get_cf(&cf, key.to_bytes())? {
            Some(bytes) => IndexVersion::from_bytes(&bytes)?,
            None => return Err(StoreError::VersionNotFound(name.to_string(), number)),
        };

        if !version.active {
            return Ok(version);
        }

        version.active = false;
        self.db.put_cf(&cf, key.to_bytes(), version.to_bytes()?)?;
        info!(index = %name, version = number, "Deactivated version");

        Ok(version)
    }

    /// Delete a version record outright.
    ///
    /// Only used to compensate a failed create before the version was ever
    /// visible; completed versions are retired, never removed, so history
    /// and number allocation stay intact.
    pub fn remove_version(&self, name: &str, number: u32) -> Result<(), StoreError> {
        let cf = self
            .db
            .cf_handle(CF_VERSIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_VERSIONS.to_string()))?;

        self.db
            .delete_cf(&cf, VersionKey::new(name, number).to_bytes())?;
        debug!(index = %name, version = number, "Removed version record");
        Ok(())
    }

    // ==================== Action Log Methods ====================

    /// Append an action record, assigning its sequence number.
    ///
    /// The record and its per-index pointer are written atomically.
    /// Returns the stored record with the sequence filled in.
    pub fn append_action(&self, action: &IndexAction) -> Result<IndexAction, StoreError> {
        let actions_cf = self
            .db
            .cf_handle(CF_ACTIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_ACTIONS.to_string()))?;
        let index_cf = self
            .db
            .cf_handle(CF_ACTION_INDEX)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_ACTION_INDEX.to_string()))?;

        let mut stored = action.clone();
        stored.sequence = self.next_action_sequence();

        let action_key = ActionKey::new(stored.sequence);
        let pointer_key = ActionIndexKey::new(&stored.index_name, stored.sequence);

        let mut batch = WriteBatch::default();
        batch.put_cf(&actions_cf, action_key.to_bytes(), stored.to_bytes()?);
        batch.put_cf(&index_cf, pointer_key.to_bytes(), []);

        self.db.write(batch)?;
        debug!(
            index = %stored.index_name,
            kind = %stored.kind,
            sequence = stored.sequence,
            "Appended action"
        );

        Ok(stored)
    }

    /// Finalize an action record exactly once.
    ///
    /// Fails with `ActionFinished` when the record already reached a
    /// terminal state.
    pub fn finish_action(
        &self,
        sequence: u64,
        status: ActionStatus,
        error: Option<String>,
        docs_indexed: u64,
    ) -> Result<IndexAction, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_ACTIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_ACTIONS.to_string()))?;

        let key = ActionKey::new(sequence);
        let mut action = match self.db.get_cf(&cf, key.to_bytes())? {
            Some(bytes) => IndexAction::from_bytes(&bytes)?,
            None => return Err(StoreError::ActionNotFound(sequence)),
        };

        if action.is_finished() {
            return Err(StoreError::ActionFinished(sequence));
        }

        action.status = status;
        action.finished_at = Some(chrono::Utc::now());
        action.error = error;
        action.docs_indexed = docs_indexed;

        self.db.put_cf(&cf, key.to_bytes(), action.to_bytes()?)?;
        debug!(
            index = %action.index_name,
            sequence = sequence,
            status = %action.status,
            "Finished action"
        );

        Ok(action)
    }

    /// Get the most recent actions for one index, ascending by sequence.
    ///
    /// When more than `limit` records exist, the oldest are skipped.
    pub fn actions_for_index(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<IndexAction>, StoreError> {
        let actions_cf = self
            .db
            .cf_handle(CF_ACTIONS)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_ACTIONS.to_string()))?;
        let index_cf = self
            .db
            .cf_handle(CF_ACTION_INDEX)
            .ok_or_else(|| StoreError::ColumnFamilyNotFound(CF_ACTION_INDEX.to_string()))?;

        let prefix = ActionIndexKey::prefix(name);
        let mut sequences = Vec::new();

        let iter = self
            .db
            .iterator_cf(&index_cf, IteratorMode::From(&prefix, Direction::Forward));

        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            sequences.push(ActionIndexKey::from_bytes(&key)?.sequence);
        }

        if sequences.len() > limit {
            sequences = sequences.split_off(sequences.len() - limit);
        }

        let mut actions = Vec::with_capacity(sequences.len());
        for sequence in sequences {
            let key = ActionKey::new(sequence);
            match self.db.get_cf(&actions_cf, key.to_bytes())? {
                Some(bytes) => actions.push(IndexAction::from_bytes(&bytes)?),
                None => return Err(StoreError::ActionNotFound(sequence)),
            }
        }

        Ok(actions)
    }

    /// Flush all column families to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.flush_cf(&cf)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchmig_types::{ActionKind, SchemaDefinition, SchemaFingerprint};
    use tempfile::TempDir;

    fn create_test_store() -> (VersionStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = VersionStore::open(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn sample_fingerprint() -> SchemaFingerprint {
        SchemaDefinition::empty().fingerprint()
    }

    fn sample_version(name: &str, number: u32) -> IndexVersion {
        IndexVersion::new(name, number, sample_fingerprint())
    }

    #[test]
    fn test_open_creates_column_families() {
        let (store, _temp) = create_test_store();
        for cf_name in ALL_CF_NAMES {
            assert!(
                store.db.cf_handle(cf_name).is_some(),
                "CF {} should exist",
                cf_name
            );
        }
    }

    #[test]
    fn test_register_index_idempotent() {
        let (store, _temp) = create_test_store();

        let (first, created1) = store.register_index("course_search").unwrap();
        let (second, created2) = store.register_index("course_search").unwrap();

        assert!(created1);
        assert!(!created2);
        assert_eq!(
            first.created_at.timestamp_millis(),
            second.created_at.timestamp_millis()
        );
        assert!(store.get_index("course_search").unwrap().is_some());
        assert!(store.get_index("other").unwrap().is_none());
    }

    #[test]
    fn test_list_indexes() {
        let (store, _temp) = create_test_store();
        store.register_index("b_index").unwrap();
        store.register_index("a_index").unwrap();

        let names: Vec<String> = store
            .list_indexes()
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["a_index", "b_index"]);
    }

    #[test]
    fn test_insert_version_requires_index() {
        let (store, _temp) = create_test_store();
        let result = store.insert_version(&sample_version("ghost", 1));
        assert!(matches!(result, Err(StoreError::IndexNotFound(_))));
    }

    #[test]
    fn test_insert_and_get_version() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();

        store
            .insert_version(&sample_version("course_search", 1))
            .unwrap();

        let version = store.get_version("course_search", 1).unwrap().unwrap();
        assert_eq!(version.number, 1);
        assert_eq!(version.status, VersionStatus::Created);
        assert!(store.get_version("course_search", 2).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_version_rejected() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();
        store
            .insert_version(&sample_version("course_search", 1))
            .unwrap();

        let result = store.insert_version(&sample_version("course_search", 1));
        assert!(matches!(result, Err(StoreError::VersionExists(_, 1))));
    }

    #[test]
    fn test_versions_ordered_numerically() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();
        for number in [3, 1, 10, 2] {
            store
                .insert_version(&sample_version("course_search", number))
                .unwrap();
        }

        let numbers: Vec<u32> = store
            .versions("course_search")
            .unwrap()
            .into_iter()
            .map(|v| v.number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 10]);
    }

    #[test]
    fn test_versions_scoped_to_index() {
        let (store, _temp) = create_test_store();
        store.register_index("course").unwrap();
        store.register_index("course_search").unwrap();
        store.insert_version(&sample_version("course", 1)).unwrap();
        store
            .insert_version(&sample_version("course_search", 7))
            .unwrap();

        let versions = store.versions("course").unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].number, 1);
    }

    #[test]
    fn test_activate_switches_exactly_one() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();
        store
            .insert_version(&sample_version("course_search", 1))
            .unwrap();
        store
            .insert_version(&sample_version("course_search", 2))
            .unwrap();

        store.activate_version("course_search", 1).unwrap();
        let activated = store.activate_version("course_search", 2).unwrap();

        assert!(activated.active);
        assert_eq!(activated.status, VersionStatus::Live);

        let versions = store.versions("course_search").unwrap();
        let active: Vec<u32> = versions
            .iter()
            .filter(|v| v.active)
            .map(|v| v.number)
            .collect();
        assert_eq!(active, vec![2]);
    }

    #[test]
    fn test_activate_already_active_noop() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();
        store
            .insert_version(&sample_version("course_search", 1))
            .unwrap();

        store.activate_version("course_search", 1).unwrap();
        let again = store.activate_version("course_search", 1).unwrap();
        assert!(again.active);
    }

    #[test]
    fn test_activate_missing_version() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();

        let result = store.activate_version("course_search", 9);
        assert!(matches!(result, Err(StoreError::VersionNotFound(_, 9))));
    }

    #[test]
    fn test_activate_retired_rejected() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();
        store
            .insert_version(&sample_version("course_search", 1))
            .unwrap();
        store
            .update_version("course_search", 1, |v| {
                v.status = VersionStatus::Retired;
            })
            .unwrap();

        let result = store.activate_version("course_search", 1);
        assert!(matches!(result, Err(StoreError::RetiredImmutable(_, 1))));
    }

    #[test]
    fn test_deactivate() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();
        store
            .insert_version(&sample_version("course_search", 1))
            .unwrap();
        store.activate_version("course_search", 1).unwrap();

        let deactivated = store.deactivate_version("course_search", 1).unwrap();
        assert!(!deactivated.active);
        assert!(store.active_version("course_search").unwrap().is_none());

        // Deactivating an inactive version is a no-op
        let again = store.deactivate_version("course_search", 1).unwrap();
        assert!(!again.active);
    }

    #[test]
    fn test_update_version_persists() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();
        store
            .insert_version(&sample_version("course_search", 1))
            .unwrap();

        store
            .update_version("course_search", 1, |v| {
                v.status = VersionStatus::Reindexing;
                v.doc_count = 42;
            })
            .unwrap();

        let version = store.get_version("course_search", 1).unwrap().unwrap();
        assert_eq!(version.status, VersionStatus::Reindexing);
        assert_eq!(version.doc_count, 42);
    }

    #[test]
    fn test_update_retired_immutable() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();
        store
            .insert_version(&sample_version("course_search", 1))
            .unwrap();
        store
            .update_version("course_search", 1, |v| {
                v.status = VersionStatus::Retired;
            })
            .unwrap();

        let result = store.update_version("course_search", 1, |v| v.doc_count = 1);
        assert!(matches!(result, Err(StoreError::RetiredImmutable(_, 1))));
    }

    #[test]
    fn test_remove_version() {
        let (store, _temp) = create_test_store();
        store.register_index("course_search").unwrap();
        store
            .insert_version(&sample_version("course_search", 1))
            .unwrap();

        store.remove_version("course_search", 1).unwrap();
        assert!(store.get_version("course_search", 1).unwrap().is_none());
    }

    #[test]
    fn test_append_action_assigns_sequence() {
        let (store, _temp) = create_test_store();

        let first = store
            .append_action(&IndexAction::begin("course_search", ActionKind::Create))
            .unwrap();
        let second = store
            .append_action(&IndexAction::begin("course_search", ActionKind::Update))
            .unwrap();

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(first.status, ActionStatus::Running);
    }

    #[test]
    fn test_finish_action_exactly_once() {
        let (store, _temp) = create_test_store();
        let action = store
            .append_action(&IndexAction::begin("course_search", ActionKind::Drop))
            .unwrap();

        let finished = store
            .finish_action(action.sequence, ActionStatus::Succeeded, None, 0)
            .unwrap();
        assert_eq!(finished.status, ActionStatus::Succeeded);
        assert!(finished.finished_at.is_some());

        let again = store.finish_action(action.sequence, ActionStatus::Failed, None, 0);
        assert!(matches!(again, Err(StoreError::ActionFinished(_))));
    }

    #[test]
    fn test_finish_action_records_failure() {
        let (store, _temp) = create_test_store();
        let action = store
            .append_action(&IndexAction::begin("course_search", ActionKind::Update))
            .unwrap();

        let finished = store
            .finish_action(
                action.sequence,
                ActionStatus::Failed,
                Some("engine unavailable".to_string()),
                120,
            )
            .unwrap();
        assert_eq!(finished.status, ActionStatus::Failed);
        assert_eq!(finished.error.as_deref(), Some("engine unavailable"));
        assert_eq!(finished.docs_indexed, 120);
    }

    #[test]
    fn test_actions_for_index_scoped_and_limited() {
        let (store, _temp) = create_test_store();

        for _ in 0..3 {
            store
                .append_action(&IndexAction::begin("course_search", ActionKind::Update))
                .unwrap();
        }
        store
            .append_action(&IndexAction::begin("other", ActionKind::Create))
            .unwrap();

        let all = store.actions_for_index("course_search", usize::MAX).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].sequence < w[1].sequence));

        let limited = store.actions_for_index("course_search", 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].sequence, all[1].sequence);
        assert_eq!(limited[1].sequence, all[2].sequence);
    }

    #[test]
    fn test_action_sequence_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = VersionStore::open(temp_dir.path()).unwrap();
            store
                .append_action(&IndexAction::begin("course_search", ActionKind::Create))
                .unwrap();
            store
                .append_action(&IndexAction::begin("course_search", ActionKind::Update))
                .unwrap();
        }

        let store = VersionStore::open(temp_dir.path()).unwrap();
        let next = store
            .append_action(&IndexAction::begin("course_search", ActionKind::Activate))
            .unwrap();
        assert_eq!(next.sequence, 2);
    }
}
