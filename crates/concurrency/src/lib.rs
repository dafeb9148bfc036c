//! Concurrency control for stock decrements
//!
//! This crate implements three interchangeable locking strategies behind
//! [`DecreaseStrategy`]:
//! - [`PessimisticStrategy`]: exclusive row lock inside one transaction
//! - [`OptimisticStrategy`]: version-checked write, conflicts surfaced
//! - [`NamedLockStrategy`]: named lock enclosing the whole transaction
//!
//! plus [`RetryingStrategy`], a bounded retry wrapper for optimistic
//! conflicts.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod named;
pub mod optimistic;
pub mod pessimistic;
pub mod retry;
pub mod strategy;

pub use named::NamedLockStrategy;
pub use optimistic::OptimisticStrategy;
pub use pessimistic::PessimisticStrategy;
pub use retry::{RetryPolicy, RetryingStrategy};
pub use strategy::{DecreaseStrategy, LockingMode};
