//! The strategy contract shared by all locking disciplines.

use serde::{Deserialize, Serialize};
use stockguard_core::{StockId, StockResult};

/// Which concurrency-control discipline guards a decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockingMode {
    /// Exclusive row lock for the duration of the transaction
    #[default]
    Pessimistic,
    /// Version-checked write; conflicts fail fast
    Optimistic,
    /// Version-checked write wrapped in a bounded retry loop
    OptimisticRetry,
    /// Named lock acquired before and released after the transaction
    NamedLock,
}

impl LockingMode {
    /// Whether concurrent successful calls on one id are serialized
    pub fn serializes(&self) -> bool {
        matches!(self, LockingMode::Pessimistic | LockingMode::NamedLock)
    }

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            LockingMode::Pessimistic => "pessimistic",
            LockingMode::Optimistic => "optimistic",
            LockingMode::OptimisticRetry => "optimistic_retry",
            LockingMode::NamedLock => "named_lock",
        }
    }
}

impl std::fmt::Display for LockingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A way of decrementing a stock record safely under concurrency.
///
/// Implementations are synchronous: a call blocks until its decrement has
/// committed or failed, and every failure leaves the committed quantity
/// untouched.
pub trait DecreaseStrategy: Send + Sync {
    /// Discipline implemented by this strategy
    fn mode(&self) -> LockingMode;

    /// Take `amount` units from record `id`, returning the new quantity
    fn decrease(&self, id: StockId, amount: u64) -> StockResult<u64>;

    /// Retries performed so far (non-zero only for retrying wrappers)
    fn retries(&self) -> u64 {
        0
    }
}

impl<T: DecreaseStrategy + ?Sized> DecreaseStrategy for Box<T> {
    fn mode(&self) -> LockingMode {
        (**self).mode()
    }

    fn decrease(&self, id: StockId, amount: u64) -> StockResult<u64> {
        (**self).decrease(id, amount)
    }

    fn retries(&self) -> u64 {
        (**self).retries()
    }
}
