//! # Named locks
//!
//! ## Purpose
//! Mutual exclusion keyed by a caller-chosen name, independent of the
//! storage engine. The external mutex strategy takes a lock named after the
//! stock id before it opens a storage transaction, and releases it after
//! the transaction has committed or rolled back.
//!
//! ## Design Decisions
//! - **Fencing tokens**: every acquisition gets a fresh token; releasing a
//!   stale handle is a no-op, which makes `release` idempotent
//! - **Bounded waits**: `acquire` takes an optional timeout; `None` blocks
//! - **Scoped release**: [`NamedLockGuard`] releases on drop, so a
//!   panicking holder never strands the lock
//!
//! ## Backend Support
//!
//! - **InMemory**: [`MemoryLockManager`], a `Mutex` + `Condvar` lock table
//!
//! ## Example
//! ```
//! use stockguard_locks::{with_lock, LockError, MemoryLockManager, NamedLockManager};
//! use std::time::Duration;
//!
//! let manager = MemoryLockManager::new();
//! let value = with_lock(&manager, "stock:1", Some(Duration::from_secs(1)), || {
//!     Ok::<_, LockError>(42)
//! })
//! .unwrap();
//! assert_eq!(value, 42);
//! assert!(!manager.is_locked("stock:1").unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod guard;
pub mod manager;
pub mod memory;

pub use error::{LockError, LockResult};
pub use guard::{with_lock, NamedLockGuard};
pub use manager::{LockHandle, NamedLockManager};
pub use memory::MemoryLockManager;
