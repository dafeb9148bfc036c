//! Storage layer for stockguard
//!
//! This crate implements the Stock Store contract with:
//! - StockStore: the trait strategies are written against
//! - TransactionContext: explicit transaction scope passed into every call
//! - RowLock: exclusive per-record lock held until the transaction ends
//! - MemoryStockStore: DashMap-backed in-memory engine
//! - Compare-and-write (`write_versioned`) for optimistic writers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod lock;
pub mod memory;
pub mod options;
pub mod store;
pub mod transaction;

pub use error::{StoreError, StoreResult};
pub use lock::RowLock;
pub use memory::MemoryStockStore;
pub use options::StoreOptions;
pub use store::StockStore;
pub use transaction::{PendingWrite, TransactionContext, TransactionStatus};
