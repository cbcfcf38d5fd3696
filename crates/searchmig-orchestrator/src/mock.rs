//! Mock index definition for tests and local runs.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream;
use futures::StreamExt;

use searchmig_types::{Document, SchemaDefinition};

use crate::registry::{DocumentStream, FeedError, IndexDefinition};

/// In-memory [`IndexDefinition`] backed by a document list.
///
/// Supports swapping the schema mid-test to simulate a deploy that
/// changes mappings, and injecting feed failures to exercise resumable
/// update paths.
pub struct MockDefinition {
    name: String,
    schema: Mutex<SchemaDefinition>,
    documents: Mutex<Vec<Document>>,
    /// When set, the feed yields this many documents and then errors
    fail_after: Mutex<Option<usize>>,
    /// When true, the next feed fails on setup before yielding anything
    fail_setup: Mutex<bool>,
}

impl MockDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Mutex::new(SchemaDefinition::empty()),
            documents: Mutex::new(Vec::new()),
            fail_after: Mutex::new(None),
            fail_setup: Mutex::new(false),
        }
    }

    /// Replace the schema this definition reports.
    pub fn set_schema(&self, schema: SchemaDefinition) {
        *self.schema.lock().expect("mock state poisoned") = schema;
    }

    /// Replace the backing document set.
    pub fn set_documents(&self, documents: Vec<Document>) {
        *self.documents.lock().expect("mock state poisoned") = documents;
    }

    /// Add one document, upserting by id like a real source table would.
    pub fn push_document(&self, document: Document) {
        let mut documents = self.documents.lock().expect("mock state poisoned");
        documents.retain(|d| d.id != document.id);
        documents.push(document);
    }

    /// Make the next feed yield `count` documents and then fail.
    pub fn fail_feed_after(&self, count: usize) {
        *self.fail_after.lock().expect("mock state poisoned") = Some(count);
    }

    /// Make the next feed fail before yielding anything.
    pub fn fail_next_feed(&self) {
        *self.fail_setup.lock().expect("mock state poisoned") = true;
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().expect("mock state poisoned").len()
    }
}

#[async_trait]
impl IndexDefinition for MockDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> SchemaDefinition {
        self.schema.lock().expect("mock state poisoned").clone()
    }

    async fn changed_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<DocumentStream, FeedError> {
        if std::mem::take(&mut *self.fail_setup.lock().expect("mock state poisoned")) {
            return Err(FeedError::new("injected feed setup failure"));
        }

        let mut matching: Vec<Document> = self
            .documents
            .lock()
            .expect("mock state poisoned")
            .iter()
            .filter(|d| since.map_or(true, |s| d.updated_at >= s))
            .cloned()
            .collect();
        matching.sort_by_key(|d| d.updated_at);

        let fail_after = self.fail_after.lock().expect("mock state poisoned").take();

        let items: Vec<Result<Document, FeedError>> = match fail_after {
            Some(count) => {
                matching.truncate(count);
                let mut items: Vec<Result<Document, FeedError>> =
                    matching.into_iter().map(Ok).collect();
                items.push(Err(FeedError::new("injected feed failure")));
                items
            }
            None => matching.into_iter().map(Ok).collect(),
        };

        Ok(stream::iter(items).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use futures::TryStreamExt;
    use serde_json::json;

    fn doc(id: &str, ts_millis: i64) -> Document {
        Document {
            id: id.to_string(),
            updated_at: Utc.timestamp_millis_opt(ts_millis).unwrap(),
            source: json!({ "id": id }),
        }
    }

    #[tokio::test]
    async fn test_complete_feed_ascending() {
        let definition = MockDefinition::new("courses");
        definition.set_documents(vec![doc("b", 2_000), doc("a", 1_000), doc("c", 3_000)]);

        let docs: Vec<Document> = definition
            .changed_since(None)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_since_boundary_is_inclusive() {
        let definition = MockDefinition::new("courses");
        definition.set_documents(vec![doc("a", 1_000), doc("b", 2_000), doc("c", 3_000)]);

        let since = Utc.timestamp_millis_opt(2_000).unwrap();
        let docs: Vec<Document> = definition
            .changed_since(Some(since))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_fail_after_truncates_feed() {
        let definition = MockDefinition::new("courses");
        definition.set_documents(vec![doc("a", 1_000), doc("b", 2_000), doc("c", 3_000)]);
        definition.fail_feed_after(2);

        let mut stream = definition.changed_since(None).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().id, "a");
        assert_eq!(stream.next().await.unwrap().unwrap().id, "b");
        assert!(stream.next().await.unwrap().is_err());

        // The knob is one-shot
        let docs: Vec<Document> = definition
            .changed_since(None)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[tokio::test]
    async fn test_push_document_upserts() {
        let definition = MockDefinition::new("courses");
        definition.push_document(doc("a", 1_000));
        definition.push_document(doc("a", 5_000));

        assert_eq!(definition.document_count(), 1);
        let docs: Vec<Document> = definition
            .changed_since(None)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(docs[0].updated_at.timestamp_millis(), 5_000);
    }
}
