//! Transaction scope
//!
//! A [`TransactionContext`] is created by [`StockStore::begin`] and passed
//! explicitly into every storage call. It tracks:
//! - Status (Active → Committed | Aborted)
//! - Buffered writes, applied only at commit
//! - Row locks taken by `fetch_locked` and writes, released at commit or
//!   rollback
//!
//! Dropping a context that still holds row locks releases them, so a
//! forgotten or panicking transaction never strands a row.
//!
//! [`StockStore::begin`]: crate::StockStore::begin

use crate::error::{StoreError, StoreResult};
use crate::lock::RowLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stockguard_core::{StockId, StockRecord};

/// Lifecycle state of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Accepting reads and writes
    Active,
    /// Writes applied with the given commit version
    Committed {
        /// Store-wide commit version
        version: u64,
    },
    /// Writes discarded
    Aborted {
        /// Human-readable reason
        reason: String,
    },
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Active => write!(f, "active"),
            TransactionStatus::Committed { version } => write!(f, "committed@{}", version),
            TransactionStatus::Aborted { reason } => write!(f, "aborted: {}", reason),
        }
    }
}

/// A buffered write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    /// Quantity to store at commit
    pub quantity: u64,
}

/// Explicit transaction scope
#[derive(Debug)]
pub struct TransactionContext {
    /// Unique transaction id
    pub txn_id: u64,
    /// Current status
    pub status: TransactionStatus,
    started_at: Instant,
    timeout: Option<Duration>,
    write_set: BTreeMap<StockId, PendingWrite>,
    locked_rows: BTreeMap<StockId, Arc<RowLock>>,
}

impl TransactionContext {
    /// Create an active transaction
    pub fn new(txn_id: u64, timeout: Option<Duration>) -> Self {
        Self {
            txn_id,
            status: TransactionStatus::Active,
            started_at: Instant::now(),
            timeout,
            write_set: BTreeMap::new(),
            locked_rows: BTreeMap::new(),
        }
    }

    /// Whether the transaction still accepts operations
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Fail with `TransactionNotActive` unless active
    pub fn ensure_active(&self) -> StoreResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(StoreError::TransactionNotActive {
                txn_id: self.txn_id,
                state: self.status.to_string(),
            })
        }
    }

    /// Only active transactions can be rolled back
    pub fn can_rollback(&self) -> bool {
        self.is_active()
    }

    /// Time since `begin`
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether the configured timeout has passed
    pub fn is_expired(&self) -> bool {
        self.timeout.is_some_and(|timeout| self.elapsed() > timeout)
    }

    /// Buffered write for `id`, if any
    pub fn pending_write(&self, id: StockId) -> Option<&PendingWrite> {
        self.write_set.get(&id)
    }

    /// Number of buffered writes
    pub fn write_count(&self) -> usize {
        self.write_set.len()
    }

    /// Whether this transaction holds the row lock for `id`
    pub fn holds_lock(&self, id: StockId) -> bool {
        self.locked_rows.contains_key(&id)
    }

    /// Overlay the buffered write for `record.id` onto a committed record
    pub fn read_own_write(&self, mut record: StockRecord) -> StockRecord {
        if let Some(pending) = self.write_set.get(&record.id) {
            record.quantity = pending.quantity;
        }
        record
    }

    pub(crate) fn buffer_write(&mut self, record: &StockRecord) {
        self.write_set.insert(
            record.id,
            PendingWrite {
                quantity: record.quantity,
            },
        );
    }

    pub(crate) fn record_lock(&mut self, id: StockId, lock: Arc<RowLock>) {
        self.locked_rows.entry(id).or_insert(lock);
    }

    pub(crate) fn take_write_set(&mut self) -> BTreeMap<StockId, PendingWrite> {
        std::mem::take(&mut self.write_set)
    }

    pub(crate) fn mark_committed(&mut self, version: u64) {
        self.status = TransactionStatus::Committed { version };
    }

    /// Mark aborted and drop buffered writes
    pub fn mark_aborted(&mut self, reason: impl Into<String>) {
        self.write_set.clear();
        self.status = TransactionStatus::Aborted {
            reason: reason.into(),
        };
    }

    /// Release every row lock this transaction holds
    pub(crate) fn release_locks(&mut self) -> usize {
        let locks = std::mem::take(&mut self.locked_rows);
        locks
            .values()
            .filter(|lock| lock.release(self.txn_id))
            .count()
    }
}

impl Drop for TransactionContext {
    fn drop(&mut self) {
        if !self.locked_rows.is_empty() {
            let released = self.release_locks();
            tracing::debug!(
                txn_id = self.txn_id,
                released,
                "transaction dropped while holding row locks"
            );
        }
    }
}
