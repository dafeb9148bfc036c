//! Pessimistic strategy: locked read, decrement, write, commit.
//!
//! The row lock taken by `fetch_locked` is held until commit, so every
//! caller on the same id sees the quantity left by the previous one.

use crate::strategy::{DecreaseStrategy, LockingMode};
use std::sync::Arc;
use stockguard_core::{decrement, StockError, StockId, StockResult};
use stockguard_storage::StockStore;
use tracing::debug;

/// Row-exclusive locking inside a single storage transaction
pub struct PessimisticStrategy<S: StockStore> {
    store: Arc<S>,
}

impl<S: StockStore> PessimisticStrategy<S> {
    /// Create a strategy over `store`
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: StockStore> DecreaseStrategy for PessimisticStrategy<S> {
    fn mode(&self) -> LockingMode {
        LockingMode::Pessimistic
    }

    fn decrease(&self, id: StockId, amount: u64) -> StockResult<u64> {
        decrement::validate_amount(amount)?;

        self.store.transaction(|txn| {
            let record = self.store.fetch_locked(txn, id)?;
            let next = decrement::apply(&record, amount)?;
            self.store.write(txn, &next)?;
            debug!(txn_id = txn.txn_id, %id, remaining = next.quantity, "pessimistic decrement");
            Ok::<_, StockError>(next.quantity)
        })
    }
}
