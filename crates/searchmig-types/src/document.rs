//! Document payload handed to the engine during reindexing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document to be written to a physical index.
///
/// `updated_at` is the source-of-truth modification time and drives
/// incremental change selection; change feeds must yield documents in
/// ascending `updated_at` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Engine document id, stable across reindex passes
    pub id: String,

    /// Source-of-truth modification time
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,

    /// Engine document body
    pub source: Value,
}

impl Document {
    /// Create a document from id, modification time, and body.
    pub fn new(id: impl Into<String>, updated_at: DateTime<Utc>, source: Value) -> Self {
        Self {
            id: id.into(),
            updated_at,
            source,
        }
    }
}
