//! Column family definitions for RocksDB.
//!
//! Each column family isolates records with different access patterns:
//! - indexes: one small record per logical index
//! - versions: version records, prefix-scanned per index
//! - actions: append-only audit log keyed by sequence
//! - action_index: per-index pointers into the action log

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for logical index records
pub const CF_INDEXES: &str = "indexes";

/// Column family name for index version records
pub const CF_VERSIONS: &str = "versions";

/// Column family name for the append-only action log
pub const CF_ACTIONS: &str = "actions";

/// Column family name for per-index action pointers
pub const CF_ACTION_INDEX: &str = "action_index";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_INDEXES, CF_VERSIONS, CF_ACTIONS, CF_ACTION_INDEX];

/// Create column family options for the action log (append-only, compressed)
fn actions_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_INDEXES, Options::default()),
        ColumnFamilyDescriptor::new(CF_VERSIONS, Options::default()),
        ColumnFamilyDescriptor::new(CF_ACTIONS, actions_options()),
        ColumnFamilyDescriptor::new(CF_ACTION_INDEX, Options::default()),
    ]
}
