//! Storage errors.

use stockguard_core::{StockError, StockId};
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`StockStore`](crate::StockStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record for the id
    #[error("record not found: {0}")]
    NotFound(StockId),

    /// Insert of an id that already has a record
    #[error("record already exists: {0}")]
    AlreadyExists(StockId),

    /// Compare-and-write saw a different committed version
    #[error("version conflict on {id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Record id
        id: StockId,
        /// Version the writer read
        expected: u64,
        /// Version currently committed
        actual: u64,
    },

    /// Versioned write found the row held by another uncommitted writer
    #[error("write conflict on {id}: row held by transaction {holder} (read version {version})")]
    WriteConflict {
        /// Record id
        id: StockId,
        /// Version the writer read
        version: u64,
        /// Transaction holding the row
        holder: u64,
    },

    /// Row lock still held by another transaction when the wait expired
    #[error("lock wait timeout on {id} after {waited_ms}ms")]
    LockWaitTimeout {
        /// Record id
        id: StockId,
        /// Time spent waiting
        waited_ms: u64,
    },

    /// Transaction outlived its configured timeout and was rolled back
    #[error("transaction {txn_id} timed out after {elapsed_ms}ms")]
    TransactionTimeout {
        /// Transaction id
        txn_id: u64,
        /// Age of the transaction at commit
        elapsed_ms: u64,
    },

    /// Operation on a committed or aborted transaction
    #[error("transaction {txn_id} not active ({state})")]
    TransactionNotActive {
        /// Transaction id
        txn_id: u64,
        /// Current state
        state: String,
    },

    /// Engine failure (I/O, connection, ...)
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Check if this is a version conflict.
    pub fn is_version_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::VersionConflict { .. } | StoreError::WriteConflict { .. }
        )
    }
}

impl From<StoreError> for StockError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => StockError::NotFound { id },
            StoreError::VersionConflict {
                id,
                expected,
                actual,
            } => StockError::ConcurrentModification {
                id,
                expected_version: expected,
                actual_version: actual,
            },
            // The holder commits `version + 1`
            StoreError::WriteConflict { id, version, .. } => StockError::ConcurrentModification {
                id,
                expected_version: version,
                actual_version: version + 1,
            },
            other => StockError::Persistence(other.to_string()),
        }
    }
}
