//! The stock facade: one store, one locking discipline.
//!
//! This module provides [`StockFacade`], the primary entry point for
//! decrementing stock. The strategy is chosen once, at build time, from a
//! [`FacadeConfig`]; every call goes through the same strategy.

use crate::config::FacadeConfig;
use crate::error::{Error, Result};
use crate::metrics::{FacadeMetrics, MetricsRecorder};
use std::sync::Arc;
use std::time::Duration;
use stockguard_concurrency::{
    DecreaseStrategy, LockingMode, NamedLockStrategy, OptimisticStrategy, PessimisticStrategy,
    RetryPolicy, RetryingStrategy,
};
use stockguard_core::{decrement, StockId, StockRecord, StockResult};
use stockguard_locks::{MemoryLockManager, NamedLockManager};
use stockguard_storage::StockStore;
use tracing::{debug, debug_span, info, warn};

/// Decrements stock under the configured locking discipline.
///
/// # Example
///
/// ```
/// use stockguard::prelude::*;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStockStore::new());
/// let facade = StockFacade::builder(store)
///     .mode(LockingMode::OptimisticRetry)
///     .build()
///     .unwrap();
///
/// facade.create(StockId::new(7), 3).unwrap();
/// assert_eq!(facade.decrease(StockId::new(7), 2).unwrap(), 1);
/// assert!(facade.decrease(StockId::new(7), 2).is_err());
/// assert_eq!(facade.quantity(StockId::new(7)), Some(1));
/// ```
pub struct StockFacade<S: StockStore> {
    store: Arc<S>,
    strategy: Box<dyn DecreaseStrategy>,
    config: FacadeConfig,
    metrics: MetricsRecorder,
}

impl<S: StockStore + 'static> StockFacade<S> {
    /// Start configuring a facade over `store`.
    pub fn builder(store: Arc<S>) -> StockFacadeBuilder<S> {
        StockFacadeBuilder::new(store)
    }

    /// Facade over `store` with a default configuration of `mode`.
    pub fn with_mode(store: Arc<S>, mode: LockingMode) -> Result<Self> {
        StockFacadeBuilder::new(store).mode(mode).build()
    }
}

impl<S: StockStore> StockFacade<S> {
    /// Take `amount` units from record `id`.
    ///
    /// Returns the quantity left after the decrement. On any error the
    /// record keeps its last committed quantity.
    pub fn decrease(&self, id: StockId, amount: u64) -> StockResult<u64> {
        let span = debug_span!("decrease", %id, amount, mode = %self.strategy.mode());
        let _enter = span.enter();

        let result = decrement::validate_amount(amount)
            .and_then(|amount| self.strategy.decrease(id, amount));

        match &result {
            Ok(remaining) => {
                self.metrics.record_commit();
                debug!(remaining, "decrement committed");
            }
            Err(e) if e.is_conflict() || e.is_lock_failure() => {
                self.metrics.record_failure(e);
                warn!(error = %e, "decrement failed under contention");
            }
            Err(e) => {
                self.metrics.record_failure(e);
                debug!(error = %e, "decrement rejected");
            }
        }
        result
    }

    /// Create a record holding `quantity` units.
    pub fn create(&self, id: StockId, quantity: u64) -> Result<StockRecord> {
        self.store.insert(id, quantity).map_err(Error::from)
    }

    /// Last committed quantity of `id`.
    pub fn quantity(&self, id: StockId) -> Option<u64> {
        self.store.get(id).map(|record| record.quantity)
    }

    /// Last committed record for `id`.
    pub fn record(&self, id: StockId) -> Option<StockRecord> {
        self.store.get(id)
    }

    /// Locking discipline in use.
    pub fn mode(&self) -> LockingMode {
        self.strategy.mode()
    }

    /// Configuration the facade was built with.
    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Get facade metrics.
    pub fn metrics(&self) -> FacadeMetrics {
        self.metrics.snapshot(self.strategy.retries())
    }
}

impl<S: StockStore> std::fmt::Debug for StockFacade<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockFacade")
            .field("mode", &self.strategy.mode())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for facade configuration.
///
/// # Example
///
/// ```
/// use stockguard::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let store = Arc::new(MemoryStockStore::new());
/// let locks: Arc<dyn NamedLockManager> = Arc::new(MemoryLockManager::new());
///
/// let facade = StockFacade::builder(store)
///     .mode(LockingMode::NamedLock)
///     .lock_manager(locks)
///     .lock_timeout(Some(Duration::from_millis(500)))
///     .build()
///     .unwrap();
/// assert_eq!(facade.mode(), LockingMode::NamedLock);
/// ```
pub struct StockFacadeBuilder<S: StockStore> {
    store: Arc<S>,
    locks: Option<Arc<dyn NamedLockManager>>,
    config: FacadeConfig,
}

impl<S: StockStore + 'static> StockFacadeBuilder<S> {
    /// Create a new builder with default settings.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: None,
            config: FacadeConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: FacadeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the locking discipline.
    pub fn mode(mut self, mode: LockingMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the retry budget used by [`LockingMode::OptimisticRetry`].
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy.into();
        self
    }

    /// Set the named lock wait. `None` waits indefinitely.
    pub fn lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.lock_timeout = timeout.map(|t| t.as_millis() as u64);
        self
    }

    /// Set the prefix of named lock keys.
    pub fn lock_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.lock_key_prefix = prefix.into();
        self
    }

    /// Use `locks` for [`LockingMode::NamedLock`].
    ///
    /// Without one, named-lock mode falls back to an in-process
    /// [`MemoryLockManager`], which only excludes callers of this facade.
    pub fn lock_manager(mut self, locks: Arc<dyn NamedLockManager>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Validate the configuration and build the facade.
    pub fn build(self) -> Result<StockFacade<S>> {
        self.config.validate()?;

        let store = self.store;
        let config = self.config;
        let strategy: Box<dyn DecreaseStrategy> = match config.mode {
            LockingMode::Pessimistic => Box::new(PessimisticStrategy::new(Arc::clone(&store))),
            LockingMode::Optimistic => Box::new(OptimisticStrategy::new(Arc::clone(&store))),
            LockingMode::OptimisticRetry => Box::new(RetryingStrategy::new(
                OptimisticStrategy::new(Arc::clone(&store)),
                config.retry_policy(),
            )),
            LockingMode::NamedLock => {
                let locks = self.locks.unwrap_or_else(|| {
                    info!("no lock manager configured, using in-process named locks");
                    let fallback: Arc<dyn NamedLockManager> = Arc::new(MemoryLockManager::new());
                    fallback
                });
                Box::new(
                    NamedLockStrategy::new(Arc::clone(&store), locks, config.lock_timeout())
                        .with_key_prefix(config.lock_key_prefix.clone()),
                )
            }
        };

        debug!(mode = %config.mode, "stock facade built");
        Ok(StockFacade {
            store,
            strategy,
            config,
            metrics: MetricsRecorder::default(),
        })
    }
}
