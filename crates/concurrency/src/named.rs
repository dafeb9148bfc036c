//! External mutex strategy.
//!
//! ```text
//! acquire("stock:{id}") ──fail──► LockTimeout / LockAcquisitionFailed (no transaction)
//!        │
//!        ▼
//!   begin ─► fetch ─► apply ─► write ─► commit | rollback
//!        │
//!        ▼
//!   release("stock:{id}")   (every exit path, after commit/rollback)
//! ```
//!
//! The storage reads are unlocked: the named lock already excludes every
//! other caller using this strategy for the same id.

use crate::strategy::{DecreaseStrategy, LockingMode};
use std::sync::Arc;
use std::time::Duration;
use stockguard_core::{decrement, StockError, StockId, StockResult};
use stockguard_locks::{with_lock, NamedLockManager};
use stockguard_storage::StockStore;
use tracing::debug;

/// Default prefix of named lock keys
pub const DEFAULT_KEY_PREFIX: &str = "stock:";

/// Named lock enclosing one storage transaction
pub struct NamedLockStrategy<S: StockStore, L: NamedLockManager + ?Sized> {
    store: Arc<S>,
    locks: Arc<L>,
    lock_timeout: Option<Duration>,
    key_prefix: String,
}

impl<S: StockStore, L: NamedLockManager + ?Sized> NamedLockStrategy<S, L> {
    /// Create a strategy waiting at most `lock_timeout` for the lock
    pub fn new(store: Arc<S>, locks: Arc<L>, lock_timeout: Option<Duration>) -> Self {
        Self {
            store,
            locks,
            lock_timeout,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Override the lock key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Named lock key guarding `id`
    pub fn lock_key(&self, id: StockId) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    /// The decrement run while the named lock is held
    fn decrease_in_transaction(&self, id: StockId, amount: u64) -> StockResult<u64> {
        self.store.transaction(|txn| {
            let record = self.store.fetch(txn, id)?;
            let next = decrement::apply(&record, amount)?;
            self.store.write(txn, &next)?;
            debug!(txn_id = txn.txn_id, %id, remaining = next.quantity, "named-lock decrement");
            Ok::<_, StockError>(next.quantity)
        })
    }
}

impl<S: StockStore, L: NamedLockManager + ?Sized> DecreaseStrategy for NamedLockStrategy<S, L> {
    fn mode(&self) -> LockingMode {
        LockingMode::NamedLock
    }

    fn decrease(&self, id: StockId, amount: u64) -> StockResult<u64> {
        decrement::validate_amount(amount)?;

        let key = self.lock_key(id);
        // The transaction helper returns only after commit or rollback, so
        // the release in `with_lock` always follows the end of the transaction.
        with_lock(self.locks.as_ref(), &key, self.lock_timeout, || {
            self.decrease_in_transaction(id, amount)
        })
    }
}
