//! Durable metadata store for the searchmig index lifecycle.
//!
//! Provides RocksDB-backed storage with:
//! - Column family isolation for indexes, versions, and the action log
//! - Zero-padded keys so prefix scans return records in order
//! - Atomic activation switches via WriteBatch
//! - Version-number collision detection as a concurrency backstop
//! - A monotonic action sequence restored on reopen

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;

pub use db::VersionStore;
pub use error::StoreError;
pub use keys::{ActionIndexKey, ActionKey, IndexKey, VersionKey};
