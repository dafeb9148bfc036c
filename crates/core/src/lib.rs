//! Core types for stockguard
//!
//! This crate defines the pieces every other layer agrees on:
//! - [`StockId`] and [`StockRecord`]: the guarded inventory counter
//! - [`StockError`]: the canonical error taxonomy for `decrease`
//! - [`decrement`]: the pure decrement rule (sufficiency check + arithmetic)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decrement;
pub mod error;
pub mod types;

pub use decrement::{apply, validate_amount};
pub use error::{StockError, StockResult};
pub use types::{StockId, StockRecord};
