//! # stockguard
//!
//! Concurrent decrements of a shared inventory counter.
//!
//! The invariant is simple: the quantity never goes negative and the sum of
//! successful decrements never exceeds the starting quantity. stockguard
//! offers four locking modes for keeping it under contention, one per facade:
//!
//! - [`LockingMode::Pessimistic`] - exclusive row lock for the whole transaction
//! - [`LockingMode::Optimistic`] - version-checked write, conflicts fail fast
//! - [`LockingMode::OptimisticRetry`] - the same, retried with a bounded budget
//! - [`LockingMode::NamedLock`] - named lock acquired before the transaction
//!   and released after it ends
//!
//! ## Quick Start
//!
//! ```
//! use stockguard::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStockStore::new());
//! let facade = StockFacade::builder(store)
//!     .mode(LockingMode::Pessimistic)
//!     .build()
//!     .unwrap();
//!
//! facade.create(StockId::new(1), 100).unwrap();
//! assert_eq!(facade.decrease(StockId::new(1), 1).unwrap(), 99);
//! ```
//!
//! ## Configuration
//!
//! [`FacadeConfig`] can be built in code or parsed from TOML:
//!
//! ```
//! use stockguard::{FacadeConfig, LockingMode};
//!
//! let config = FacadeConfig::from_toml_str(r#"
//!     mode = "named_lock"
//!     lock_timeout_ms = 3000
//! "#).unwrap();
//! assert_eq!(config.mode, LockingMode::NamedLock);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod facade;
mod metrics;

pub mod prelude;

// Re-export main entry points
pub use config::{FacadeConfig, RetryConfig};
pub use error::{ConfigError, Error, Result};
pub use facade::{StockFacade, StockFacadeBuilder};
pub use metrics::FacadeMetrics;

// Re-export layer types
pub use stockguard_concurrency::{
    DecreaseStrategy, LockingMode, NamedLockStrategy, OptimisticStrategy, PessimisticStrategy,
    RetryPolicy, RetryingStrategy,
};
pub use stockguard_core::{StockId, StockRecord};
pub use stockguard_locks::{LockHandle, MemoryLockManager, NamedLockManager};
pub use stockguard_storage::{MemoryStockStore, StockStore, StoreOptions, TransactionContext};
