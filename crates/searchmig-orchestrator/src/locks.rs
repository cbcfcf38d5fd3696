//! Per-index command serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Keyed async locks, one per index name.
///
/// Commands against the same index queue up; commands against different
/// indexes run in parallel. Guards are owned so they can be held across
/// await points for the whole command.
#[derive(Default)]
pub struct IndexLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl IndexLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one index, waiting if a command is running.
    pub async fn acquire(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("lock table poisoned");
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
