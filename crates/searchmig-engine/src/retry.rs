//! Bounded retry with exponential backoff for transient engine failures.

use backoff::{backoff::Backoff, ExponentialBackoff};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

use searchmig_types::ReindexSettings;

use crate::error::EngineError;

/// Retry policy applied to engine calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts before giving up
    pub max_retries: u32,
    /// First backoff interval
    pub initial_backoff: Duration,
    /// Upper bound for the backoff interval
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Derive a policy from the reindex settings.
    pub fn from_settings(settings: &ReindexSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
            ..Default::default()
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Run an engine call, retrying transient failures with backoff.
///
/// Fatal errors return immediately; transient errors are retried until
/// the policy's attempt budget runs out, then the last error is returned.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let mut backoff = policy.backoff();
    let mut attempts = 0;

    loop {
        attempts += 1;
        debug!(operation = operation, attempt = attempts, "Calling engine");

        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                if attempts >= policy.max_retries {
                    error!(operation = operation, error = %e, "Max retries exceeded");
                    return Err(e);
                }

                match backoff.next_backoff() {
                    Some(duration) => {
                        warn!(
                            operation = operation,
                            error = %e,
                            retry_in_ms = duration.as_millis(),
                            "Engine call failed, retrying"
                        );
                        tokio::time::sleep(duration).await;
                    }
                    None => {
                        error!(operation = operation, error = %e, "Backoff exhausted");
                        return Err(e);
                    }
                }
            }
        }
    }
}
