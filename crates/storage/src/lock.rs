//! Exclusive row locks.
//!
//! A row lock is owned by a transaction id rather than by a guard, because
//! it must outlive the call that took it and is only released when the
//! owning transaction commits or rolls back. Re-acquiring a lock already
//! owned by the same transaction succeeds immediately.

use crate::error::{StoreError, StoreResult};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use stockguard_core::StockId;

/// Exclusive lock on one stock record.
#[derive(Debug)]
pub struct RowLock {
    id: StockId,
    /// Transaction currently holding the lock
    owner: Mutex<Option<u64>>,
    released: Condvar,
}

impl RowLock {
    /// Create an unlocked row lock for `id`
    pub fn new(id: StockId) -> Self {
        Self {
            id,
            owner: Mutex::new(None),
            released: Condvar::new(),
        }
    }

    /// Block until `txn_id` owns the lock, or `timeout` elapses.
    ///
    /// `None` waits forever.
    pub fn acquire(&self, txn_id: u64, timeout: Option<Duration>) -> StoreResult<()> {
        let started = Instant::now();
        let deadline = timeout.map(|t| started + t);
        let mut owner = self.owner.lock();

        loop {
            match *owner {
                None => {
                    *owner = Some(txn_id);
                    return Ok(());
                }
                Some(current) if current == txn_id => return Ok(()),
                Some(_) => match deadline {
                    Some(deadline) => {
                        if self.released.wait_until(&mut owner, deadline).timed_out()
                            && owner.is_some_and(|current| current != txn_id)
                        {
                            return Err(StoreError::LockWaitTimeout {
                                id: self.id,
                                waited_ms: started.elapsed().as_millis() as u64,
                            });
                        }
                    }
                    None => self.released.wait(&mut owner),
                },
            }
        }
    }

    /// Take the lock for `txn_id` only if it is free or already owned.
    ///
    /// Never waits. Returns the current owner when another transaction
    /// holds the lock.
    pub fn try_acquire(&self, txn_id: u64) -> Result<(), u64> {
        let mut owner = self.owner.lock();
        match *owner {
            None => {
                *owner = Some(txn_id);
                Ok(())
            }
            Some(current) if current == txn_id => Ok(()),
            Some(current) => Err(current),
        }
    }

    /// Release the lock if `txn_id` owns it.
    ///
    /// Returns `false` when the lock was free or owned by someone else.
    pub fn release(&self, txn_id: u64) -> bool {
        let mut owner = self.owner.lock();
        if *owner == Some(txn_id) {
            *owner = None;
            drop(owner);
            self.released.notify_one();
            true
        } else {
            false
        }
    }

    /// Current owner, if any
    pub fn owner(&self) -> Option<u64> {
        *self.owner.lock()
    }

    /// Whether any transaction holds the lock
    pub fn is_locked(&self) -> bool {
        self.owner().is_some()
    }
}
