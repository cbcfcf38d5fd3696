//! Search engine client contract for the searchmig lifecycle layer.
//!
//! Provides:
//! - The [`SearchEngine`] trait implemented per concrete engine
//! - An error taxonomy split into transient and fatal failures
//! - A bounded-retry helper with exponential backoff
//! - An in-memory engine with failure injection for tests and local use

pub mod client;
pub mod error;
pub mod memory;
pub mod retry;

pub use client::{BulkFailure, BulkResponse, SearchEngine};
pub use error::EngineError;
pub use memory::InMemoryEngine;
pub use retry::{with_retry, RetryPolicy};
