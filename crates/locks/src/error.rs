//! Error types for named lock operations.

use stockguard_core::StockError;
use thiserror::Error;

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;

/// Errors that can occur during lock operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// Lock still held by another holder when the wait expired
    #[error("Lock timeout: {key} after {waited_ms}ms")]
    Timeout {
        /// Lock key
        key: String,
        /// Time spent waiting
        waited_ms: u64,
    },

    /// Lock service refused or could not serve the request
    #[error("Lock acquisition failed: {key}: {reason}")]
    AcquisitionFailed {
        /// Lock key
        key: String,
        /// Reason reported by the backend
        reason: String,
    },

    /// Invalid lock key
    #[error("Invalid lock key: {0}")]
    InvalidKey(String),

    /// Backend error (network, database, ...)
    #[error("Backend error: {key}: {message}")]
    BackendError {
        /// Lock key the request was for
        key: String,
        /// Backend message
        message: String,
    },
}

impl From<LockError> for StockError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Timeout { key, waited_ms } => StockError::LockTimeout { key, waited_ms },
            LockError::AcquisitionFailed { key, reason } => {
                StockError::LockAcquisitionFailed { key, reason }
            }
            LockError::InvalidKey(key) => StockError::LockAcquisitionFailed {
                reason: "invalid key".to_string(),
                key,
            },
            LockError::BackendError { key, message } => StockError::LockAcquisitionFailed {
                key,
                reason: message,
            },
        }
    }
}
