//! Store options.

use std::time::Duration;

/// Options for an in-memory stock store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Maximum time a transaction waits for a row lock (`None` waits forever)
    pub lock_wait_timeout: Option<Duration>,
    /// Maximum age of a transaction at commit (`None` disables the check)
    pub transaction_timeout: Option<Duration>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            lock_wait_timeout: Some(Duration::from_secs(5)),
            transaction_timeout: None,
        }
    }
}

impl StoreOptions {
    /// Fail fast: short lock waits and a one second transaction budget
    pub fn fail_fast() -> Self {
        StoreOptions {
            lock_wait_timeout: Some(Duration::from_millis(100)),
            transaction_timeout: Some(Duration::from_secs(1)),
        }
    }

    /// Set the row lock wait timeout
    pub fn with_lock_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_wait_timeout = timeout;
        self
    }

    /// Set the transaction timeout
    pub fn with_transaction_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transaction_timeout = timeout;
        self
    }
}
