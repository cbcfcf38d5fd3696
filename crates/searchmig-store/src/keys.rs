//! Key encoding and decoding for the version store.
//!
//! Key formats:
//! - index: `idx:{name}`
//! - version: `ver:{name}:{number:010}`
//! - action: `act:{sequence:020}`
//! - action index: `byindex:{name}:{sequence:020}`
//!
//! Numbers are zero-padded so lexicographic key order matches numeric
//! order, which makes RocksDB prefix iteration return versions and actions
//! in ascending order. Index names never contain `:` (enforced by name
//! validation), so the segment split is unambiguous.

use crate::error::StoreError;

/// Key for logical index records.
/// Format: idx:{name}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    /// Logical index name
    pub name: String,
}

impl IndexKey {
    /// Create a key for the given index name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Encode key to bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("idx:{}", self.name).into_bytes()
    }
}

/// Key for index version records.
/// Format: ver:{name}:{number:010}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionKey {
    /// Logical index name
    pub index_name: String,
    /// Version number
    pub number: u32,
}

impl VersionKey {
    /// Create a key for the given index name and version number.
    pub fn new(index_name: impl Into<String>, number: u32) -> Self {
        Self {
            index_name: index_name.into(),
            number,
        }
    }

    /// Encode key to bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("ver:{}:{:010}", self.index_name, self.number).into_bytes()
    }

    /// Decode key from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StoreError::Key(format!("Invalid UTF-8: {}", e)))?;

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts[0] != "ver" {
            return Err(StoreError::Key(format!("Invalid version key format: {}", s)));
        }

        let number: u32 = parts[2]
            .parse()
            .map_err(|e| StoreError::Key(format!("Invalid version number: {}", e)))?;

        Ok(Self {
            index_name: parts[1].to_string(),
            number,
        })
    }

    /// Generate the prefix covering all versions of one index.
    pub fn prefix(index_name: &str) -> Vec<u8> {
        format!("ver:{}:", index_name).into_bytes()
    }
}

/// Key for action log records.
/// Format: act:{sequence:020}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionKey {
    /// Monotonic sequence number
    pub sequence: u64,
}

impl ActionKey {
    /// Create a key for the given sequence.
    pub fn new(sequence: u64) -> Self {
        Self { sequence }
    }

    /// Encode key to bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("act:{:020}", self.sequence).into_bytes()
    }

    /// Decode key from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StoreError::Key(format!("Invalid UTF-8: {}", e)))?;

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 || parts[0] != "act" {
            return Err(StoreError::Key(format!("Invalid action key format: {}", s)));
        }

        let sequence: u64 = parts[1]
            .parse()
            .map_err(|e| StoreError::Key(format!("Invalid sequence: {}", e)))?;

        Ok(Self { sequence })
    }
}

/// Key linking an index to one of its actions.
/// Format: byindex:{name}:{sequence:020}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionIndexKey {
    /// Logical index name
    pub index_name: String,
    /// Action sequence number
    pub sequence: u64,
}

impl ActionIndexKey {
    /// Create a key for the given index name and sequence.
    pub fn new(index_name: impl Into<String>, sequence: u64) -> Self {
        Self {
            index_name: index_name.into(),
            sequence,
        }
    }

    /// Encode key to bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("byindex:{}:{:020}", self.index_name, self.sequence).into_bytes()
    }

    /// Decode key from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StoreError::Key(format!("Invalid UTF-8: {}", e)))?;

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts[0] != "byindex" {
            return Err(StoreError::Key(format!(
                "Invalid action index key format: {}",
                s
            )));
        }

        let sequence: u64 = parts[2]
            .parse()
            .map_err(|e| StoreError::Key(format!("Invalid sequence: {}", e)))?;

        Ok(Self {
            index_name: parts[1].to_string(),
            sequence,
        })
    }

    /// Generate the prefix covering all actions of one index.
    pub fn prefix(index_name: &str) -> Vec<u8> {
        format!("byindex:{}:", index_name).into_bytes()
    }
}
