//! Integration tests for the index lifecycle.
//!
//! These tests walk complete operator workflows: deploying a schema,
//! populating and activating versions, migrating to a changed schema,
//! and recovering interrupted reindex passes.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use tempfile::TempDir;

use searchmig_engine::InMemoryEngine;
use searchmig_orchestrator::{
    IndexOrchestrator, IndexRegistry, MockDefinition, OrchestratorError,
};
use searchmig_store::VersionStore;
use searchmig_types::{
    ActionKind, ActionStatus, Document, ReindexSettings, SchemaDefinition, UpdateMode,
    VersionSelector, VersionStatus,
};

/// Test harness wiring a store, an in-memory engine, and one definition.
struct TestHarness {
    _temp_dir: TempDir,
    store: Arc<VersionStore>,
    engine: Arc<InMemoryEngine>,
    definition: Arc<MockDefinition>,
    orchestrator: IndexOrchestrator,
}

impl TestHarness {
    fn new(index_name: &str, batch_size: usize) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(VersionStore::open(temp_dir.path()).expect("Failed to open store"));
        let engine = Arc::new(InMemoryEngine::new());

        let definition = Arc::new(MockDefinition::new(index_name));
        definition.set_schema(schema_v1());

        let mut registry = IndexRegistry::new();
        registry
            .register(definition.clone())
            .expect("Failed to register definition");

        let settings = ReindexSettings {
            batch_size,
            max_retries: 1,
            max_backoff_ms: 5,
        };
        let orchestrator =
            IndexOrchestrator::new(registry, store.clone(), engine.clone(), &settings);

        Self {
            _temp_dir: temp_dir,
            store,
            engine,
            definition,
            orchestrator,
        }
    }

    /// Load the stored record for one version.
    fn version(&self, name: &str, number: u32) -> searchmig_types::IndexVersion {
        self.store
            .get_version(name, number)
            .expect("store read failed")
            .expect("version missing")
    }
}

fn schema_v1() -> SchemaDefinition {
    SchemaDefinition::new(
        json!({ "number_of_shards": 1 }),
        json!({ "properties": {
            "title": { "type": "text" },
            "description": { "type": "text" }
        }}),
    )
}

fn schema_v2() -> SchemaDefinition {
    SchemaDefinition::new(
        json!({ "number_of_shards": 1 }),
        json!({ "properties": {
            "title": { "type": "text" },
            "description": { "type": "text" },
            "tags": { "type": "keyword" }
        }}),
    )
}

/// Build `count` documents with ascending timestamps well in the past.
fn seed_documents(count: usize) -> Vec<Document> {
    let base = Utc::now() - ChronoDuration::hours(1);
    (0..count)
        .map(|i| Document {
            id: format!("course-{}", i),
            updated_at: base + ChronoDuration::seconds(i as i64),
            source: json!({
                "id": format!("course-{}", i),
                "title": format!("Course {}", i),
                "description": "An example course"
            }),
        })
        .collect()
}

// ==================== Full Deployment Lifecycle ====================

#[tokio::test]
async fn test_schema_migration_end_to_end() {
    let h = TestHarness::new("course_search", 100);
    h.definition.set_documents(seed_documents(500));

    // First deploy: materialize version 1 and populate it
    let outcome = h.orchestrator.create("course_search").await.unwrap();
    assert!(outcome.is_created());
    assert_eq!(outcome.version().number, 1);
    assert!(h.engine.has_index("course_search-1"));

    let report = h
        .orchestrator
        .update("course_search", VersionSelector::Latest, UpdateMode::Full)
        .await
        .unwrap();
    assert_eq!(report.docs_indexed, 500);
    assert_eq!(report.batches, 5);
    assert_eq!(h.engine.count("course_search-1").await.unwrap(), 500);

    h.orchestrator
        .activate("course_search", VersionSelector::Latest)
        .await
        .unwrap();
    assert_eq!(
        h.store.active_version("course_search").unwrap().unwrap().number,
        1
    );

    // A deploy ships a changed schema: version 2 appears, reads still
    // resolve to version 1
    h.definition.set_schema(schema_v2());
    let outcome = h.orchestrator.create("course_search").await.unwrap();
    assert!(outcome.is_created());
    assert_eq!(outcome.version().number, 2);
    assert_eq!(
        h.store.active_version("course_search").unwrap().unwrap().number,
        1
    );

    // A fresh version has no cursor, so its first incremental pass is a
    // complete build
    let report = h
        .orchestrator
        .update("course_search", VersionSelector::Latest, UpdateMode::Incremental)
        .await
        .unwrap();
    assert_eq!(report.docs_indexed, 500);
    assert_eq!(h.engine.count("course_search-2").await.unwrap(), 500);

    // Cut reads over to version 2, atomically
    h.orchestrator
        .activate("course_search", VersionSelector::Latest)
        .await
        .unwrap();
    let versions = h.store.versions("course_search").unwrap();
    let active: Vec<u32> = versions.iter().filter(|v| v.active).map(|v| v.number).collect();
    assert_eq!(active, vec![2]);

    // Ten documents change after the switch; the next incremental pass
    // touches only those
    let now = Utc::now();
    for i in 0..10 {
        h.definition.push_document(Document {
            id: format!("course-{}", i),
            updated_at: now,
            source: json!({ "id": format!("course-{}", i), "title": "Updated" }),
        });
    }
    let report = h
        .orchestrator
        .update("course_search", VersionSelector::Active, UpdateMode::Incremental)
        .await
        .unwrap();
    assert_eq!(report.docs_indexed, 10);
    assert_eq!(h.engine.count("course_search-2").await.unwrap(), 500);

    // Retire the old version once nothing reads from it
    let retired = h.orchestrator.drop_version("course_search", 1).await.unwrap();
    assert_eq!(retired.status, VersionStatus::Retired);
    assert!(!h.engine.has_index("course_search-1"));
    assert!(h.engine.has_index("course_search-2"));

    // The listing shows the whole history
    let statuses = h.orchestrator.list_status(false).await.unwrap();
    assert_eq!(statuses.len(), 1);
    let rows = &statuses[0].versions;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].status, VersionStatus::Retired);
    assert!(!rows[0].active);
    assert_eq!(rows[0].doc_count, 0);
    assert_eq!(rows[1].status, VersionStatus::Live);
    assert!(rows[1].active);
    assert_eq!(rows[1].doc_count, 500);
}

// ==================== Interrupted Reindex Recovery ====================

#[tokio::test]
async fn test_interrupted_update_resumes_from_cursor() {
    let h = TestHarness::new("course_search", 3);
    let documents = seed_documents(10);
    let sixth_ts = documents[5].updated_at;
    h.definition.set_documents(documents);

    h.orchestrator.create("course_search").await.unwrap();

    // The feed dies after six documents: two batches land, the third
    // never arrives
    h.definition.fail_feed_after(6);
    let err = h
        .orchestrator
        .update("course_search", VersionSelector::Latest, UpdateMode::Incremental)
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::ChangeFeed(..)));
    assert_eq!(h.engine.bulk_calls(), 2);

    let version = h.version("course_search", 1);
    assert_eq!(version.status, VersionStatus::Reindexing);
    assert_eq!(version.cursor, Some(sixth_ts));

    // The next pass asks only for the tail and completes the build
    let report = h
        .orchestrator
        .update("course_search", VersionSelector::Latest, UpdateMode::Incremental)
        .await
        .unwrap();
    assert_eq!(report.docs_indexed, 5);
    assert_eq!(h.engine.count("course_search-1").await.unwrap(), 10);
    assert_eq!(h.version("course_search", 1).status, VersionStatus::Live);
}

#[tokio::test]
async fn test_engine_outage_is_recoverable_by_rerunning() {
    let h = TestHarness::new("course_search", 5);
    h.definition.set_documents(seed_documents(10));

    h.orchestrator.create("course_search").await.unwrap();

    // The engine is down when the pass starts
    h.engine.fail_next_bulk(1);
    let err = h
        .orchestrator
        .update("course_search", VersionSelector::Latest, UpdateMode::Incremental)
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::Engine(_)));

    // The failure is on the audit trail
    let history = h.orchestrator.action_history("course_search", 10).unwrap();
    let failed = history.last().unwrap();
    assert_eq!(failed.kind, ActionKind::Update);
    assert_eq!(failed.status, ActionStatus::Failed);
    assert!(failed.error.is_some());

    // Recovery is just running the same command again
    let report = h
        .orchestrator
        .update("course_search", VersionSelector::Latest, UpdateMode::Incremental)
        .await
        .unwrap();
    assert_eq!(report.doc_count, 10);
}

// ==================== Deploy Pipeline ====================

#[tokio::test]
async fn test_predeploy_then_activate_all() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(VersionStore::open(temp_dir.path()).unwrap());
    let engine = Arc::new(InMemoryEngine::new());

    let courses = Arc::new(MockDefinition::new("course_search"));
    courses.set_schema(schema_v1());
    courses.set_documents(seed_documents(20));
    let tags = Arc::new(MockDefinition::new("tag_search"));
    tags.set_schema(schema_v2());

    let mut registry = IndexRegistry::new();
    registry.register(courses.clone()).unwrap();
    registry.register(tags.clone()).unwrap();

    let settings = ReindexSettings {
        batch_size: 10,
        max_retries: 1,
        max_backoff_ms: 5,
    };
    let orchestrator = IndexOrchestrator::new(registry, store.clone(), engine.clone(), &settings);

    let report = orchestrator.predeploy().await;
    assert!(report.all_ok());
    assert_eq!(report.applied, vec!["course_search", "tag_search"]);
    assert_eq!(engine.count("course_search-1").await.unwrap(), 20);
    assert_eq!(engine.count("tag_search-1").await.unwrap(), 0);

    // Nothing serves reads until the explicit switch
    assert!(store.active_version("course_search").unwrap().is_none());
    assert!(store.active_version("tag_search").unwrap().is_none());

    let report = orchestrator.activate_all_latest().await;
    assert!(report.all_ok());
    assert_eq!(store.active_version("course_search").unwrap().unwrap().number, 1);
    assert_eq!(store.active_version("tag_search").unwrap().unwrap().number, 1);

    // Re-running predeploy with unchanged schemas is a no-op
    let report = orchestrator.predeploy().await;
    assert!(report.all_ok());
    assert_eq!(store.versions("course_search").unwrap().len(), 1);
    assert_eq!(store.versions("tag_search").unwrap().len(), 1);
}

// ==================== Durability ====================

#[tokio::test]
async fn test_lifecycle_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = Arc::new(VersionStore::open(temp_dir.path()).unwrap());
        let engine = Arc::new(InMemoryEngine::new());
        let definition = Arc::new(MockDefinition::new("course_search"));
        definition.set_schema(schema_v1());
        definition.set_documents(seed_documents(8));

        let mut registry = IndexRegistry::new();
        registry.register(definition).unwrap();
        let settings = ReindexSettings {
            batch_size: 4,
            max_retries: 1,
            max_backoff_ms: 5,
        };
        let orchestrator = IndexOrchestrator::new(registry, store.clone(), engine, &settings);

        orchestrator.create("course_search").await.unwrap();
        orchestrator
            .update("course_search", VersionSelector::Latest, UpdateMode::Full)
            .await
            .unwrap();
        orchestrator
            .activate("course_search", VersionSelector::Latest)
            .await
            .unwrap();
    }

    let store = VersionStore::open(temp_dir.path()).unwrap();

    let active = store.active_version("course_search").unwrap().unwrap();
    assert_eq!(active.number, 1);
    assert_eq!(active.status, VersionStatus::Live);
    assert_eq!(active.doc_count, 8);
    assert!(active.cursor.is_some());

    let actions = store.actions_for_index("course_search", 10).unwrap();
    assert_eq!(actions.len(), 3);
    assert!(actions.iter().all(|a| a.status == ActionStatus::Succeeded));
    let kinds: Vec<ActionKind> = actions.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![ActionKind::Create, ActionKind::Update, ActionKind::Activate]
    );
}
