//! Scoped acquisition with guaranteed release.

use crate::{LockError, LockHandle, LockResult, NamedLockManager};
use std::time::Duration;
use tracing::error;

/// Holds a named lock until released or dropped.
///
/// Dropping the guard releases the lock, which covers early returns and
/// panics. Prefer [`NamedLockGuard::release`] on the normal path so a
/// release failure can be observed.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct NamedLockGuard<'a, M: NamedLockManager + ?Sized> {
    manager: &'a M,
    handle: Option<LockHandle>,
}

impl<'a, M: NamedLockManager + ?Sized> NamedLockGuard<'a, M> {
    /// Acquire `key` from `manager`
    pub fn acquire(manager: &'a M, key: &str, timeout: Option<Duration>) -> LockResult<Self> {
        let handle = manager.acquire(key, timeout)?;
        Ok(Self {
            manager,
            handle: Some(handle),
        })
    }

    /// The underlying handle
    pub fn handle(&self) -> Option<&LockHandle> {
        self.handle.as_ref()
    }

    /// Release now
    pub fn release(mut self) -> LockResult<()> {
        match self.handle.take() {
            Some(handle) => self.manager.release(&handle),
            None => Ok(()),
        }
    }
}

impl<M: NamedLockManager + ?Sized> Drop for NamedLockGuard<'_, M> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.manager.release(&handle) {
                error!(key = %handle.key, error = %e, "failed to release named lock on drop");
            }
        }
    }
}

/// Run `body` while holding the named lock `key`.
///
/// Sequence: acquire, run `body` to completion, release. The release runs
/// on every exit path, including a panic in `body`, and never before `body`
/// has returned. If acquisition fails `body` is not run.
///
/// A failed release is logged and does not override `body`'s result: the
/// protected work has already completed by then.
pub fn with_lock<M, T, E, F>(
    manager: &M,
    key: &str,
    timeout: Option<Duration>,
    body: F,
) -> Result<T, E>
where
    M: NamedLockManager + ?Sized,
    E: From<LockError>,
    F: FnOnce() -> Result<T, E>,
{
    let guard = NamedLockGuard::acquire(manager, key, timeout)?;
    let result = body();
    if let Err(e) = guard.release() {
        error!(key, error = %e, "failed to release named lock");
    }
    result
}
