//! Core types for the stock counter
//!
//! - [`StockId`]: identifier addressing exactly one counter
//! - [`StockRecord`]: the persisted counter with its version token

use serde::{Deserialize, Serialize};

/// Identifier of a stock record
///
/// StockId is immutable for the lifetime of a record. It is also used to
/// derive the named-lock key for the external mutex strategy.
///
/// # Examples
///
/// ```
/// use stockguard_core::StockId;
///
/// let id = StockId::new(1);
/// assert_eq!(id.as_u64(), 1);
/// assert_eq!(id.to_string(), "1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockId(u64);

impl StockId {
    /// Create a StockId from its numeric value
    pub const fn new(id: u64) -> Self {
        StockId(id)
    }

    /// Raw numeric value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for StockId {
    fn from(id: u64) -> Self {
        StockId(id)
    }
}

impl std::fmt::Display for StockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted inventory counter
///
/// Each record has:
/// - A quantity (never negative, enforced by the unsigned type and the
///   decrement rule)
/// - A version number bumped by the store on every committed write
/// - A timestamp of the last committed write
///
/// The version is only meaningful as a conflict token for optimistic
/// writes. Callers never bump it themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Record identifier
    pub id: StockId,
    /// Units currently available
    pub quantity: u64,
    /// Version of the last committed write (0 for a freshly inserted record)
    pub version: u64,
    /// Last update timestamp (milliseconds since epoch)
    pub updated_at: i64,
}

impl StockRecord {
    /// Create a new record at version 0
    pub fn new(id: StockId, quantity: u64) -> Self {
        Self::with_version(id, quantity, 0)
    }

    /// Create a record with an explicit version
    pub fn with_version(id: StockId, quantity: u64, version: u64) -> Self {
        Self {
            id,
            quantity,
            version,
            updated_at: Self::now(),
        }
    }

    /// Current timestamp in milliseconds
    pub fn now() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
