//! In-memory stock store
//!
//! DashMap of rows keyed by StockId. Each row carries its committed record
//! and an exclusive [`RowLock`].
//!
//! # Design
//!
//! - Reads clone the committed record under a short `RwLock` read guard
//! - Writes are buffered in the [`TransactionContext`] and applied at commit
//! - Any write takes the row lock, so committed versions on a row only move
//!   while its writer holds the lock; this makes `write_versioned` a true
//!   compare-and-write
//! - Row handles are cloned out of the map before blocking, so a waiting
//!   transaction never holds a DashMap shard guard

use crate::error::{StoreError, StoreResult};
use crate::lock::RowLock;
use crate::options::StoreOptions;
use crate::store::StockStore;
use crate::transaction::TransactionContext;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use stockguard_core::{StockId, StockRecord};
use tracing::{debug, warn};

/// A stored record and its row lock
#[derive(Debug)]
struct Row {
    data: RwLock<StockRecord>,
    lock: Arc<RowLock>,
}

impl Row {
    fn new(record: StockRecord) -> Self {
        Self {
            lock: Arc::new(RowLock::new(record.id)),
            data: RwLock::new(record),
        }
    }
}

/// DashMap-backed implementation of [`StockStore`]
///
/// # Thread Safety
///
/// All operations are thread-safe. Different ids never contend; the same
/// id is serialized only by its row lock.
///
/// # Example
///
/// ```
/// use stockguard_storage::{MemoryStockStore, StockStore};
/// use stockguard_core::StockId;
///
/// let store = MemoryStockStore::new();
/// store.insert(StockId::new(1), 100).unwrap();
///
/// let mut txn = store.begin();
/// let mut record = store.fetch_locked(&mut txn, StockId::new(1)).unwrap();
/// record.quantity -= 1;
/// store.write(&mut txn, &record).unwrap();
/// store.commit(&mut txn).unwrap();
///
/// assert_eq!(store.get(StockId::new(1)).unwrap().quantity, 99);
/// ```
pub struct MemoryStockStore {
    rows: DashMap<StockId, Arc<Row>>,
    options: StoreOptions,
    next_txn_id: AtomicU64,
    /// Store-wide commit version, bumped once per committing transaction
    version: AtomicU64,
}

impl MemoryStockStore {
    /// Create an empty store with default options
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create an empty store with explicit options
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            rows: DashMap::new(),
            options,
            next_txn_id: AtomicU64::new(1),
            version: AtomicU64::new(0),
        }
    }

    /// Options in effect
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Current store-wide commit version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Whether some transaction holds the row lock for `id`
    pub fn is_row_locked(&self, id: StockId) -> bool {
        self.row(id).is_ok_and(|row| row.lock.is_locked())
    }

    fn row(&self, id: StockId) -> StoreResult<Arc<Row>> {
        self.rows
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(StoreError::NotFound(id))
    }

    /// Take the row lock for `txn`, recording it in the transaction
    fn lock_row(&self, txn: &mut TransactionContext, id: StockId) -> StoreResult<Arc<Row>> {
        let row = self.row(id)?;
        if !txn.holds_lock(id) {
            row.lock.acquire(txn.txn_id, self.options.lock_wait_timeout)?;
            txn.record_lock(id, Arc::clone(&row.lock));
        }
        Ok(row)
    }
}

impl Default for MemoryStockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStockStore")
            .field("rows", &self.rows.len())
            .field("version", &self.version())
            .field("options", &self.options)
            .finish()
    }
}

impl StockStore for MemoryStockStore {
    fn begin(&self) -> TransactionContext {
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::Relaxed);
        debug!(txn_id, "begin transaction");
        TransactionContext::new(txn_id, self.options.transaction_timeout)
    }

    fn fetch(&self, txn: &TransactionContext, id: StockId) -> StoreResult<StockRecord> {
        txn.ensure_active()?;
        let row = self.row(id)?;
        let committed = row.data.read().clone();
        Ok(txn.read_own_write(committed))
    }

    fn fetch_locked(&self, txn: &mut TransactionContext, id: StockId) -> StoreResult<StockRecord> {
        txn.ensure_active()?;
        let row = self.lock_row(txn, id)?;
        let committed = row.data.read().clone();
        Ok(txn.read_own_write(committed))
    }

    fn write(&self, txn: &mut TransactionContext, record: &StockRecord) -> StoreResult<()> {
        txn.ensure_active()?;
        self.lock_row(txn, record.id)?;
        txn.buffer_write(record);
        Ok(())
    }

    fn write_versioned(
        &self,
        txn: &mut TransactionContext,
        record: &StockRecord,
    ) -> StoreResult<()> {
        txn.ensure_active()?;
        let row = self.row(record.id)?;
        if !txn.holds_lock(record.id) {
            // Optimistic writers never wait: a held row is a conflict
            if let Err(holder) = row.lock.try_acquire(txn.txn_id) {
                debug!(
                    txn_id = txn.txn_id,
                    id = %record.id,
                    holder,
                    "row held by another writer"
                );
                return Err(StoreError::WriteConflict {
                    id: record.id,
                    version: record.version,
                    holder,
                });
            }
            txn.record_lock(record.id, Arc::clone(&row.lock));
        }

        let actual = row.data.read().version;
        if actual != record.version {
            debug!(
                txn_id = txn.txn_id,
                id = %record.id,
                expected = record.version,
                actual,
                "version conflict"
            );
            return Err(StoreError::VersionConflict {
                id: record.id,
                expected: record.version,
                actual,
            });
        }

        txn.buffer_write(record);
        Ok(())
    }

    fn commit(&self, txn: &mut TransactionContext) -> StoreResult<u64> {
        txn.ensure_active()?;

        if txn.is_expired() {
            let elapsed_ms = txn.elapsed().as_millis() as u64;
            warn!(txn_id = txn.txn_id, elapsed_ms, "transaction timed out at commit");
            self.rollback(txn);
            return Err(StoreError::TransactionTimeout {
                txn_id: txn.txn_id,
                elapsed_ms,
            });
        }

        let writes = txn.take_write_set();
        let commit_version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        let now = StockRecord::now();

        for (id, pending) in &writes {
            // Rows cleared mid-transaction are skipped; there is nothing left to update.
            let Ok(row) = self.row(*id) else {
                warn!(txn_id = txn.txn_id, id = %id, "row vanished before commit");
                continue;
            };
            let mut data = row.data.write();
            data.quantity = pending.quantity;
            data.version += 1;
            data.updated_at = now;
        }

        txn.mark_committed(commit_version);
        let released = txn.release_locks();
        debug!(
            txn_id = txn.txn_id,
            commit_version,
            writes = writes.len(),
            released,
            "commit"
        );
        Ok(commit_version)
    }

    fn rollback(&self, txn: &mut TransactionContext) {
        if !txn.can_rollback() {
            return;
        }
        txn.mark_aborted("rollback");
        let released = txn.release_locks();
        debug!(txn_id = txn.txn_id, released, "rollback");
    }

    fn insert(&self, id: StockId, quantity: u64) -> StoreResult<StockRecord> {
        let record = StockRecord::new(id, quantity);
        match self.rows.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::AlreadyExists(id)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(Row::new(record.clone())));
                Ok(record)
            }
        }
    }

    fn get(&self, id: StockId) -> Option<StockRecord> {
        self.row(id).ok().map(|row| row.data.read().clone())
    }

    fn clear(&self) {
        self.rows.clear();
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}
