//! Optimistic strategy: unlocked read, decrement, version-checked write.
//!
//! Readers never block. A writer whose read version is stale gets
//! `ConcurrentModification`; this strategy never retries on its own (wrap
//! it in [`RetryingStrategy`](crate::RetryingStrategy) for that).

use crate::strategy::{DecreaseStrategy, LockingMode};
use std::sync::Arc;
use stockguard_core::{decrement, StockError, StockId, StockResult};
use stockguard_storage::StockStore;
use tracing::debug;

/// Version-checked writes, fail fast on conflict
pub struct OptimisticStrategy<S: StockStore> {
    store: Arc<S>,
}

impl<S: StockStore> OptimisticStrategy<S> {
    /// Create a strategy over `store`
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: StockStore> DecreaseStrategy for OptimisticStrategy<S> {
    fn mode(&self) -> LockingMode {
        LockingMode::Optimistic
    }

    fn decrease(&self, id: StockId, amount: u64) -> StockResult<u64> {
        decrement::validate_amount(amount)?;

        self.store.transaction(|txn| {
            let record = self.store.fetch(txn, id)?;
            let next = decrement::apply(&record, amount)?;
            self.store.write_versioned(txn, &next)?;
            debug!(
                txn_id = txn.txn_id,
                %id,
                read_version = record.version,
                remaining = next.quantity,
                "optimistic decrement"
            );
            Ok::<_, StockError>(next.quantity)
        })
    }
}
