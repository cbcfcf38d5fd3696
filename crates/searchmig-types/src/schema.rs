//! Schema definitions and content fingerprints.
//!
//! Every index version is bound to the schema it was created from. The
//! fingerprint is a content hash over the canonical JSON body, so two
//! definitions that differ only in key order hash the same and any change
//! to a mapping or setting produces a new value.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// Engine-facing schema for one index version.
///
/// Mirrors the create-index request body: `settings` carries analyzers and
/// shard configuration, `mappings` carries field definitions. Both are kept
/// as raw JSON so the engine contract stays schema-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Index settings (analyzers, shards, refresh interval, ...)
    #[serde(default = "empty_object")]
    pub settings: Value,

    /// Field mappings
    #[serde(default = "empty_object")]
    pub mappings: Value,
}

fn empty_object() -> Value {
    json!({})
}

impl SchemaDefinition {
    /// Create a definition from settings and mappings values.
    pub fn new(settings: Value, mappings: Value) -> Self {
        Self { settings, mappings }
    }

    /// Create a definition with empty settings and mappings.
    pub fn empty() -> Self {
        Self {
            settings: empty_object(),
            mappings: empty_object(),
        }
    }

    /// Full create-index request body.
    pub fn body(&self) -> Value {
        json!({
            "settings": self.settings,
            "mappings": self.mappings,
        })
    }

    /// Content hash of this definition.
    ///
    /// serde_json serializes maps with sorted keys, so the encoding is
    /// canonical and the digest is stable across key insertion order.
    pub fn fingerprint(&self) -> SchemaFingerprint {
        let canonical = self.body().to_string();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        SchemaFingerprint(format!("{:x}", hasher.finalize()))
    }
}

/// Hex SHA-256 digest identifying schema content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaFingerprint(String);

impl SchemaFingerprint {
    /// Hex digest string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened digest for log output.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl std::fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
