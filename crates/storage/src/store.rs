//! The Stock Store contract.

use crate::error::{StoreError, StoreResult};
use crate::transaction::TransactionContext;
use stockguard_core::{StockId, StockRecord};

/// Storage for stock records with pluggable lock modes.
///
/// Every read and write takes the transaction scope explicitly. A
/// transaction is ended by exactly one `commit` or `rollback`; writes are
/// invisible to other transactions until commit.
///
/// # Locking
///
/// - `fetch` never blocks and takes no lock.
/// - `fetch_locked`, `write` and `write_versioned` take the exclusive row
///   lock for the id and hold it until the transaction ends.
pub trait StockStore: Send + Sync {
    /// Open a transaction
    fn begin(&self) -> TransactionContext;

    /// Unlocked read of the committed record, overlaid with this
    /// transaction's own pending write
    fn fetch(&self, txn: &TransactionContext, id: StockId) -> StoreResult<StockRecord>;

    /// Read under the exclusive row lock
    fn fetch_locked(&self, txn: &mut TransactionContext, id: StockId) -> StoreResult<StockRecord>;

    /// Plain write of `record.quantity`, no version check
    fn write(&self, txn: &mut TransactionContext, record: &StockRecord) -> StoreResult<()>;

    /// Compare-and-write: buffers `record.quantity` only if the committed
    /// version still equals `record.version`
    ///
    /// Never waits for a row lock.
    ///
    /// # Errors
    ///
    /// - `VersionConflict` if another transaction committed in between
    /// - `WriteConflict` if another transaction holds the row uncommitted
    ///
    /// Nothing is buffered in either case.
    fn write_versioned(&self, txn: &mut TransactionContext, record: &StockRecord)
        -> StoreResult<()>;

    /// Apply buffered writes (bumping each record's version) and release
    /// row locks. Returns the store-wide commit version.
    fn commit(&self, txn: &mut TransactionContext) -> StoreResult<u64>;

    /// Discard buffered writes and release row locks. Idempotent.
    fn rollback(&self, txn: &mut TransactionContext);

    /// Create a record at version 0
    fn insert(&self, id: StockId, quantity: u64) -> StoreResult<StockRecord>;

    /// Committed record, outside any transaction
    fn get(&self, id: StockId) -> Option<StockRecord>;

    /// Remove every record
    fn clear(&self);

    /// Number of records
    fn len(&self) -> usize;

    /// Whether the store has no records
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `body` inside a transaction.
    ///
    /// Commits when `body` returns `Ok`, rolls back when it returns `Err`
    /// or panics. Returns only after commit or rollback has completed.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let quantity = store.transaction(|txn| {
    ///     let record = store.fetch_locked(txn, id)?;
    ///     let next = stockguard_core::apply(&record, 1)?;
    ///     store.write(txn, &next)?;
    ///     Ok::<_, StockError>(next.quantity)
    /// })?;
    /// ```
    fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        Self: Sized,
        E: From<StoreError>,
        F: FnOnce(&mut TransactionContext) -> Result<T, E>,
    {
        let mut scope = TransactionScope {
            store: self,
            txn: self.begin(),
        };

        match body(&mut scope.txn) {
            Ok(value) => {
                scope.store.commit(&mut scope.txn)?;
                Ok(value)
            }
            Err(e) => {
                scope.store.rollback(&mut scope.txn);
                Err(e)
            }
        }
    }
}

/// Rolls back on drop if the transaction is still active (panic path)
struct TransactionScope<'a, S: StockStore> {
    store: &'a S,
    txn: TransactionContext,
}

impl<S: StockStore> Drop for TransactionScope<'_, S> {
    fn drop(&mut self) {
        if self.txn.can_rollback() {
            self.store.rollback(&mut self.txn);
        }
    }
}
