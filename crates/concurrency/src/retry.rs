//! Bounded retry for optimistic conflicts.
//!
//! ```text
//! Attempt ──Ok──────► Success
//!    │
//!    └─conflict─► attempts left? ──yes──► sleep(backoff) ─► Attempt
//!                        │
//!                        no
//!                        ▼
//!                 RetriesExhausted
//! ```
//!
//! Every other error leaves the loop immediately. Each attempt runs the
//! inner strategy from scratch, so it re-reads the record.

use crate::strategy::{DecreaseStrategy, LockingMode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use stockguard_core::{StockError, StockId, StockResult};
use tracing::warn;

/// How often and how patiently to retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1)
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 10,
            backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retry
    pub fn none() -> Self {
        RetryPolicy {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Set the attempt budget
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the pause between attempts
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Attempt budget, never below one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Wraps a strategy and retries its retryable failures
pub struct RetryingStrategy<T: DecreaseStrategy> {
    inner: T,
    policy: RetryPolicy,
    retries: AtomicU64,
}

impl<T: DecreaseStrategy> RetryingStrategy<T> {
    /// Wrap `inner` with `policy`
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            retries: AtomicU64::new(0),
        }
    }

    /// Policy in effect
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Wrapped strategy
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: DecreaseStrategy> DecreaseStrategy for RetryingStrategy<T> {
    fn mode(&self) -> LockingMode {
        match self.inner.mode() {
            LockingMode::Optimistic => LockingMode::OptimisticRetry,
            other => other,
        }
    }

    fn decrease(&self, id: StockId, amount: u64) -> StockResult<u64> {
        let attempts = self.policy.attempts();

        for attempt in 1..=attempts {
            match self.inner.decrease(id, amount) {
                Err(e) if e.is_retryable() => {
                    if attempt == attempts {
                        warn!(%id, attempts, "giving up after repeated conflicts");
                        break;
                    }
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    warn!(%id, attempt, error = %e, "conflict, retrying");
                    if !self.policy.backoff.is_zero() {
                        thread::sleep(self.policy.backoff);
                    }
                }
                other => return other,
            }
        }

        Err(StockError::RetriesExhausted { id, attempts })
    }

    fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}
