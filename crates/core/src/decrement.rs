//! The decrement rule.
//!
//! Pure functions only: no storage access, no locking. Strategies call
//! [`apply`] on whatever record their locking discipline gave them, so the
//! sufficiency check is identical under all three strategies.

use crate::error::{StockError, StockResult};
use crate::types::StockRecord;

/// Reject a zero amount before any I/O happens.
pub fn validate_amount(amount: u64) -> StockResult<u64> {
    if amount == 0 {
        return Err(StockError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Take `amount` units from `record`.
///
/// Returns the record with `quantity - amount` and the version unchanged;
/// the store bumps the version when the write commits.
///
/// # Errors
///
/// - `InvalidAmount` if `amount == 0`
/// - `InsufficientStock` if `amount > record.quantity`
///
/// # Examples
///
/// ```
/// use stockguard_core::{apply, StockId, StockRecord};
///
/// let record = StockRecord::new(StockId::new(1), 100);
/// let next = apply(&record, 1).unwrap();
/// assert_eq!(next.quantity, 99);
/// assert_eq!(next.version, record.version);
/// ```
pub fn apply(record: &StockRecord, amount: u64) -> StockResult<StockRecord> {
    validate_amount(amount)?;

    let remaining = record
        .quantity
        .checked_sub(amount)
        .ok_or(StockError::InsufficientStock {
            id: record.id,
            requested: amount,
            available: record.quantity,
        })?;

    Ok(StockRecord {
        quantity: remaining,
        ..record.clone()
    })
}
