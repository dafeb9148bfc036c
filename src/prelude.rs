//! Convenient imports for stockguard.
//!
//! ```
//! use stockguard::prelude::*;
//! ```

// Main entry point
pub use crate::facade::{StockFacade, StockFacadeBuilder};

// Configuration and metrics
pub use crate::config::{FacadeConfig, RetryConfig};
pub use crate::metrics::FacadeMetrics;

// Error handling
pub use crate::error::{ConfigError, Error, Result, StockError, StockResult};

// Strategies
pub use stockguard_concurrency::{DecreaseStrategy, LockingMode, RetryPolicy};

// Core types
pub use stockguard_core::{StockId, StockRecord};

// Backends
pub use stockguard_locks::{MemoryLockManager, NamedLockManager};
pub use stockguard_storage::{MemoryStockStore, StockStore, StoreOptions};
