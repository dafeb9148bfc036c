//! Lock manager trait for named mutual exclusion.

use crate::LockResult;
use std::time::{Duration, Instant};

/// Maximum key length accepted by lock managers
pub const MAX_KEY_LEN: usize = 64;

/// Proof of one successful acquisition.
///
/// The token identifies this acquisition; a later holder of the same key
/// gets a different token, so releasing an old handle cannot free a lock
/// someone else now owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHandle {
    /// Lock key
    pub key: String,
    /// Fencing token, unique per acquisition
    pub token: u64,
    /// When the lock was granted
    pub acquired_at: Instant,
}

impl LockHandle {
    /// Create a handle
    pub fn new(key: impl Into<String>, token: u64) -> Self {
        Self {
            key: key.into(),
            token,
            acquired_at: Instant::now(),
        }
    }

    /// Time the lock has been held
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }
}

/// Trait for named lock management.
///
/// ## Design
/// - **Acquire**: blocks until the key is free or the timeout expires
/// - **Release**: idempotent; releasing a stale or already released handle
///   succeeds without effect
pub trait NamedLockManager: Send + Sync {
    /// Acquire the lock named `key`.
    ///
    /// ## Returns
    /// - `Ok(LockHandle)`: lock acquired
    /// - `Err(LockError::Timeout)`: still held when `timeout` expired
    /// - `Err(LockError::AcquisitionFailed)`: lock service unavailable
    /// - `Err(LockError::InvalidKey)`: empty or over-long key
    fn acquire(&self, key: &str, timeout: Option<Duration>) -> LockResult<LockHandle>;

    /// Release a previously acquired lock.
    fn release(&self, handle: &LockHandle) -> LockResult<()>;

    /// Whether `key` is currently held (non-blocking).
    fn is_locked(&self, key: &str) -> LockResult<bool>;

    /// Acquire without waiting.
    fn try_acquire(&self, key: &str) -> LockResult<LockHandle> {
        self.acquire(key, Some(Duration::ZERO))
    }
}

/// Validate a lock key.
pub fn validate_key(key: &str) -> LockResult<()> {
    if key.is_empty() {
        return Err(crate::LockError::InvalidKey("empty key".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(crate::LockError::InvalidKey(format!(
            "key longer than {} bytes: {}",
            MAX_KEY_LEN, key
        )));
    }
    Ok(())
}
