//! Engine error taxonomy.
//!
//! Transient errors (timeouts, unavailability) are worth retrying; the
//! rest are fatal and surface immediately.

use thiserror::Error;

/// Errors reported by a search engine client.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Request timed out
    #[error("Engine request timed out: {0}")]
    Timeout(String),

    /// Engine unreachable or overloaded
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// Engine rejected the request as invalid
    #[error("Engine rejected request: {0}")]
    Rejected(String),

    /// Physical index does not exist
    #[error("Physical index not found: {0}")]
    IndexNotFound(String),

    /// Physical index already exists
    #[error("Physical index already exists: {0}")]
    IndexExists(String),
}

impl EngineError {
    /// Whether retrying the request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Timeout(_) | EngineError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(EngineError::Timeout("bulk".to_string()).is_transient());
        assert!(EngineError::Unavailable("down".to_string()).is_transient());
        assert!(!EngineError::Rejected("bad mapping".to_string()).is_transient());
        assert!(!EngineError::IndexNotFound("x-1".to_string()).is_transient());
        assert!(!EngineError::IndexExists("x-1".to_string()).is_transient());
    }
}
