//! Retry policy for transient remote failures
//!
//! Remote-shell operations get a single reconnect on transient connection
//! refusal; everything else fails fast.

use std::thread;
use std::time::Duration;

use crate::error::{KcdError, Result};

/// Bounded retry with fixed backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Run `op` until it succeeds, a non-retryable error occurs, or attempts
    /// are exhausted
    pub fn run<T, F>(&self, is_retryable: fn(&KcdError) -> bool, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && is_retryable(&err) => {
                    thread::sleep(self.backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Retryable predicate for remote-shell failures: transient connection
/// problems only, never command-level failures
pub fn transient_connection(err: &KcdError) -> bool {
    match err {
        KcdError::RemoteCommandFailed { reason, .. } => {
            let reason = reason.to_ascii_lowercase();
            reason.contains("connection refused")
                || reason.contains("connection timed out")
                || reason.contains("connection reset")
        }
        _ => false,
    }
}
