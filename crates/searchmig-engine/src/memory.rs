//! In-memory engine for tests and local development.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use searchmig_types::{Document, SchemaDefinition};

use crate::client::{BulkFailure, BulkResponse, SearchEngine};
use crate::error::EngineError;

#[derive(Debug, Clone)]
struct PhysicalIndex {
    #[allow(dead_code)]
    schema: SchemaDefinition,
    docs: HashMap<String, Document>,
}

/// In-memory `SearchEngine` with failure injection.
///
/// Behaves like a minimal document store with upsert-by-id semantics.
/// Failure knobs make transient outages and per-document rejections
/// reproducible without a real engine.
pub struct InMemoryEngine {
    indexes: Mutex<HashMap<String, PhysicalIndex>>,
    /// Doc ids that bulk writes report as rejected
    rejected_ids: Mutex<HashSet<String>>,
    /// Remaining bulk calls to fail with `Unavailable`
    bulk_failures: AtomicU32,
    /// Remaining create calls to fail with `Unavailable`
    create_failures: AtomicU32,
    /// Total bulk calls observed
    bulk_calls: AtomicUsize,
}

impl InMemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self {
            indexes: Mutex::new(HashMap::new()),
            rejected_ids: Mutex::new(HashSet::new()),
            bulk_failures: AtomicU32::new(0),
            create_failures: AtomicU32::new(0),
            bulk_calls: AtomicUsize::new(0),
        }
    }

    /// Fail the next `count` bulk calls with `Unavailable`.
    pub fn fail_next_bulk(&self, count: u32) {
        self.bulk_failures.store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` create calls with `Unavailable`.
    pub fn fail_next_create(&self, count: u32) {
        self.create_failures.store(count, Ordering::SeqCst);
    }

    /// Report the given document id as rejected in bulk responses.
    pub fn reject_doc(&self, id: impl Into<String>) {
        self.rejected_ids
            .lock()
            .expect("engine state poisoned")
            .insert(id.into());
    }

    /// Total bulk calls observed, including injected failures.
    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }

    /// Whether a physical index exists.
    pub fn has_index(&self, name: &str) -> bool {
        self.indexes
            .lock()
            .expect("engine state poisoned")
            .contains_key(name)
    }

    /// All physical index names, sorted.
    pub fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .indexes
            .lock()
            .expect("engine state poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Fetch one stored document.
    pub fn get_document(&self, name: &str, id: &str) -> Option<Document> {
        self.indexes
            .lock()
            .expect("engine state poisoned")
            .get(name)
            .and_then(|index| index.docs.get(id).cloned())
    }

    /// Consume one planned failure from a counter.
    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchEngine for InMemoryEngine {
    async fn create_index(
        &self,
        name: &str,
        schema: &SchemaDefinition,
    ) -> Result<(), EngineError> {
        if Self::take_failure(&self.create_failures) {
            return Err(EngineError::Unavailable("create_index".to_string()));
        }

        let mut indexes = self.indexes.lock().expect("engine state poisoned");
        if indexes.contains_key(name) {
            return Err(EngineError::IndexExists(name.to_string()));
        }

        indexes.insert(
            name.to_string(),
            PhysicalIndex {
                schema: schema.clone(),
                docs: HashMap::new(),
            },
        );
        debug!(index = %name, "Created in-memory index");
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<(), EngineError> {
        let mut indexes = self.indexes.lock().expect("engine state poisoned");
        match indexes.remove(name) {
            Some(_) => {
                debug!(index = %name, "Deleted in-memory index");
                Ok(())
            }
            None => Err(EngineError::IndexNotFound(name.to_string())),
        }
    }

    async fn clear_index(&self, name: &str) -> Result<(), EngineError> {
        let mut indexes = self.indexes.lock().expect("engine state poisoned");
        match indexes.get_mut(name) {
            Some(index) => {
                index.docs.clear();
                Ok(())
            }
            None => Err(EngineError::IndexNotFound(name.to_string())),
        }
    }

    async fn bulk_index(
        &self,
        name: &str,
        documents: &[Document],
    ) -> Result<BulkResponse, EngineError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);

        if Self::take_failure(&self.bulk_failures) {
            return Err(EngineError::Unavailable("bulk_index".to_string()));
        }

        let rejected = self
            .rejected_ids
            .lock()
            .expect("engine state poisoned")
            .clone();
        let mut indexes = self.indexes.lock().expect("engine state poisoned");
        let index = indexes
            .get_mut(name)
            .ok_or_else(|| EngineError::IndexNotFound(name.to_string()))?;

        let mut response = BulkResponse::default();
        for doc in documents {
            if rejected.contains(&doc.id) {
                response.failures.push(BulkFailure {
                    doc_id: doc.id.clone(),
                    reason: "injected rejection".to_string(),
                });
                continue;
            }
            index.docs.insert(doc.id.clone(), doc.clone());
            response.successes += 1;
        }

        Ok(response)
    }

    async fn refresh(&self, name: &str) -> Result<(), EngineError> {
        let indexes = self.indexes.lock().expect("engine state poisoned");
        if indexes.contains_key(name) {
            Ok(())
        } else {
            Err(EngineError::IndexNotFound(name.to_string()))
        }
    }

    async fn count(&self, name: &str) -> Result<u64, EngineError> {
        let indexes = self.indexes.lock().expect("engine state poisoned");
        indexes
            .get(name)
            .map(|index| index.docs.len() as u64)
            .ok_or_else(|| EngineError::IndexNotFound(name.to_string()))
    }
}
