//! Facade counters.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use stockguard_core::StockError;

/// Snapshot of a facade's counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacadeMetrics {
    /// Decrements that committed
    pub decrements_committed: u64,
    /// Decrements that failed, any reason
    pub decrements_failed: u64,
    /// Failures keyed by [`StockError::kind`]
    pub failures_by_kind: BTreeMap<&'static str, u64>,
    /// Optimistic retries performed by the strategy
    pub retries: u64,
    /// Commit success rate (0.0 - 1.0)
    pub success_rate: f64,
    /// Total decrement calls (committed + failed)
    pub operations: u64,
}

impl FacadeMetrics {
    /// Failures of one kind
    pub fn failures(&self, kind: &str) -> u64 {
        self.failures_by_kind.get(kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct MetricsRecorder {
    committed: AtomicU64,
    failed: AtomicU64,
    by_kind: Mutex<BTreeMap<&'static str, u64>>,
}

impl MetricsRecorder {
    pub(crate) fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, error: &StockError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        *self.by_kind.lock().entry(error.kind()).or_insert(0) += 1;
    }

    pub(crate) fn snapshot(&self, retries: u64) -> FacadeMetrics {
        let committed = self.committed.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let operations = committed + failed;
        let success_rate = if operations == 0 {
            1.0
        } else {
            committed as f64 / operations as f64
        };

        FacadeMetrics {
            decrements_committed: committed,
            decrements_failed: failed,
            failures_by_kind: self.by_kind.lock().clone(),
            retries,
            success_rate,
            operations,
        }
    }
}
