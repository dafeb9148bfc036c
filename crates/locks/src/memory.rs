//! In-memory lock manager implementation.

use crate::manager::validate_key;
use crate::{LockError, LockHandle, LockResult, NamedLockManager};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct LockTable {
    /// key -> token of the current holder
    held: HashMap<String, u64>,
    closed: bool,
}

/// In-memory lock manager.
///
/// ## Purpose
/// Single-process implementation of [`NamedLockManager`] for tests and
/// embedded use.
///
/// ## Limitations
/// - Not distributed (single process only)
/// - No lease expiry: a lock is held until released
/// - One condition variable for all keys; every release wakes every waiter
#[derive(Debug)]
pub struct MemoryLockManager {
    table: Mutex<LockTable>,
    released: Condvar,
    next_token: AtomicU64,
}

impl MemoryLockManager {
    /// Create a new in-memory lock manager.
    pub fn new() -> Self {
        Self {
            table: Mutex::new(LockTable::default()),
            released: Condvar::new(),
            next_token: AtomicU64::new(1),
        }
    }

    /// Number of keys currently held
    pub fn held_count(&self) -> usize {
        self.table.lock().held.len()
    }

    /// Stop serving acquisitions.
    ///
    /// Waiters wake up and fail with `AcquisitionFailed`. Held locks can
    /// still be released.
    pub fn close(&self) {
        self.table.lock().closed = true;
        self.released.notify_all();
    }

    /// Whether [`close`](Self::close) was called
    pub fn is_closed(&self) -> bool {
        self.table.lock().closed
    }
}

impl Default for MemoryLockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NamedLockManager for MemoryLockManager {
    fn acquire(&self, key: &str, timeout: Option<Duration>) -> LockResult<LockHandle> {
        validate_key(key)?;

        let started = Instant::now();
        let deadline = timeout.map(|t| started + t);
        let mut table = self.table.lock();

        loop {
            if table.closed {
                return Err(LockError::AcquisitionFailed {
                    key: key.to_string(),
                    reason: "lock manager closed".to_string(),
                });
            }

            if !table.held.contains_key(key) {
                let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                table.held.insert(key.to_string(), token);
                debug!(key, token, "named lock acquired");
                return Ok(LockHandle::new(key, token));
            }

            match deadline {
                Some(deadline) => {
                    if self.released.wait_until(&mut table, deadline).timed_out()
                        && table.held.contains_key(key)
                        && !table.closed
                    {
                        let waited_ms = started.elapsed().as_millis() as u64;
                        warn!(key, waited_ms, "named lock wait timed out");
                        return Err(LockError::Timeout {
                            key: key.to_string(),
                            waited_ms,
                        });
                    }
                }
                None => self.released.wait(&mut table),
            }
        }
    }

    fn release(&self, handle: &LockHandle) -> LockResult<()> {
        let mut table = self.table.lock();
        match table.held.get(&handle.key) {
            Some(token) if *token == handle.token => {
                table.held.remove(&handle.key);
                drop(table);
                self.released.notify_all();
                debug!(
                    key = %handle.key,
                    token = handle.token,
                    held_ms = handle.held_for().as_millis() as u64,
                    "named lock released"
                );
            }
            _ => {
                debug!(key = %handle.key, token = handle.token, "stale release ignored");
            }
        }
        Ok(())
    }

    fn is_locked(&self, key: &str) -> LockResult<bool> {
        Ok(self.table.lock().held.contains_key(key))
    }
}
