//! # searchmig-types
//!
//! Shared domain types for the searchmig index lifecycle system:
//! - Indexes and index versions with their lifecycle states
//! - Schema definitions and content fingerprints
//! - Audit action records
//! - Documents handed to the engine during reindexing
//! - Layered application settings

pub mod action;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod schema;

pub use action::{ActionKind, ActionStatus, IndexAction, UpdateMode, VersionSelector};
pub use config::{ReindexSettings, Settings};
pub use document::Document;
pub use error::TypesError;
pub use index::{validate_index_name, Index, IndexVersion, VersionStatus};
pub use schema::{SchemaDefinition, SchemaFingerprint};
