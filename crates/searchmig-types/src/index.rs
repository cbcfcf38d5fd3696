//! Index and index-version records.
//!
//! An `Index` is the stable logical name applications search against. Each
//! schema revision materializes as an `IndexVersion` with its own physical
//! index on the engine, named `<index_name>-<number>`. Version numbers are
//! assigned once and never reused, even after a version is dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::schema::SchemaFingerprint;

/// Lifecycle state of an index version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Physical index exists but has never been populated
    Created,
    /// A reindex pass is in progress or was interrupted
    Reindexing,
    /// Populated and ready to serve
    Live,
    /// Physical index deleted, record kept for history. Terminal.
    Retired,
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionStatus::Created => write!(f, "created"),
            VersionStatus::Reindexing => write!(f, "reindexing"),
            VersionStatus::Live => write!(f, "live"),
            VersionStatus::Retired => write!(f, "retired"),
        }
    }
}

/// A logical index: the stable name applications reference.
///
/// Index records are registered once and never deleted; retiring versions
/// leaves the logical name and its history in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    /// Globally unique index name
    pub name: String,

    /// When the index was first registered
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Index {
    /// Create a new index record with the current timestamp.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Serialize to JSON bytes for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// A concrete, schema-bound materialization of an index.
///
/// At most one version per index is active at a time; the store enforces
/// the switch atomically. The cursor is the high-water mark of confirmed
/// indexed changes and drives incremental reindexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexVersion {
    /// Logical index this version belongs to
    pub index_name: String,

    /// Version number, starts at 1, strictly increasing, never reused
    pub number: u32,

    /// Fingerprint of the schema this version was created from
    pub fingerprint: SchemaFingerprint,

    /// Lifecycle state
    pub status: VersionStatus,

    /// Whether reads of the logical name resolve to this version
    #[serde(default)]
    pub active: bool,

    /// Modification time of the newest confirmed-indexed document
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub cursor: Option<DateTime<Utc>>,

    /// Document count reported by the last successful update or refresh
    #[serde(default)]
    pub doc_count: u64,

    /// When this version record was created
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl IndexVersion {
    /// Create a fresh version record in the `Created` state.
    pub fn new(index_name: impl Into<String>, number: u32, fingerprint: SchemaFingerprint) -> Self {
        Self {
            index_name: index_name.into(),
            number,
            fingerprint,
            status: VersionStatus::Created,
            active: false,
            cursor: None,
            doc_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Name of the physical index on the engine.
    pub fn physical_name(&self) -> String {
        format!("{}-{}", self.index_name, self.number)
    }

    /// Whether this version has reached its terminal state.
    pub fn is_retired(&self) -> bool {
        self.status == VersionStatus::Retired
    }

    /// Serialize to JSON bytes for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Validate a logical index name.
///
/// Names are lowercase ASCII alphanumerics plus `-` and `_`, must start
/// with a letter or digit, and are capped at 200 bytes so the physical
/// `<name>-<number>` form stays within engine limits.
pub fn validate_index_name(name: &str) -> Result<(), TypesError> {
    if name.is_empty() {
        return Err(TypesError::InvalidName("name is empty".to_string()));
    }
    if name.len() > 200 {
        return Err(TypesError::InvalidName(format!(
            "name exceeds 200 bytes: {}",
            name.len()
        )));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or(' ');
    if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
        return Err(TypesError::InvalidName(format!(
            "name must start with a lowercase letter or digit: {:?}",
            name
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
    {
        return Err(TypesError::InvalidName(format!(
            "name contains invalid character {:?}: {:?}",
            bad, name
        )));
    }
    Ok(())
}
