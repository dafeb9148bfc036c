//! Error taxonomy for stock decrements.
//!
//! Every failure of `decrease` is one of these variants. Lower layers
//! (storage, lock manager) have their own error enums and convert into
//! [`StockError`] at the strategy boundary.

use crate::types::StockId;
use thiserror::Error;

/// All decrement errors.
///
/// Whatever the variant, the record's quantity is left at its last
/// committed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// No record exists for the id
    #[error("stock not found: {id}")]
    NotFound {
        /// Requested id
        id: StockId,
    },

    /// Requested amount exceeds the current quantity
    #[error("insufficient stock for {id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Record id
        id: StockId,
        /// Amount the caller asked for
        requested: u64,
        /// Quantity at the time of the check
        available: u64,
    },

    /// Optimistic write found a newer version than the one it read
    #[error("concurrent modification of {id}: version {expected_version} is now {actual_version}")]
    ConcurrentModification {
        /// Record id
        id: StockId,
        /// Version the writer read
        expected_version: u64,
        /// Version committed in storage at write time
        actual_version: u64,
    },

    /// The retrying wrapper gave up
    #[error("retries exhausted for {id} after {attempts} attempts")]
    RetriesExhausted {
        /// Record id
        id: StockId,
        /// Attempts made, including the first one
        attempts: u32,
    },

    /// The named lock could not be acquired (lock service unavailable)
    #[error("lock acquisition failed for {key}: {reason}")]
    LockAcquisitionFailed {
        /// Lock key
        key: String,
        /// Backend reason
        reason: String,
    },

    /// The named lock was still held when the wait timed out
    #[error("lock timeout for {key} after {waited_ms}ms")]
    LockTimeout {
        /// Lock key
        key: String,
        /// Time spent waiting
        waited_ms: u64,
    },

    /// Underlying storage failure; the transaction was rolled back
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Amount must be a positive integer
    #[error("invalid amount: {0}")]
    InvalidAmount(u64),
}

/// Result type for stock operations.
pub type StockResult<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Check if this error may succeed on retry with fresh data.
    ///
    /// Only optimistic conflicts are retryable. The core never retries
    /// them implicitly.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StockError::ConcurrentModification { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StockError::NotFound { .. })
    }

    /// Check if this is an optimistic conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StockError::ConcurrentModification { .. })
    }

    /// Check if this error came from the named lock manager.
    pub fn is_lock_failure(&self) -> bool {
        matches!(
            self,
            StockError::LockAcquisitionFailed { .. } | StockError::LockTimeout { .. }
        )
    }

    /// Short stable name of the variant, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            StockError::NotFound { .. } => "not_found",
            StockError::InsufficientStock { .. } => "insufficient_stock",
            StockError::ConcurrentModification { .. } => "concurrent_modification",
            StockError::RetriesExhausted { .. } => "retries_exhausted",
            StockError::LockAcquisitionFailed { .. } => "lock_acquisition_failed",
            StockError::LockTimeout { .. } => "lock_timeout",
            StockError::Persistence(_) => "persistence",
            StockError::InvalidAmount(_) => "invalid_amount",
        }
    }
}
