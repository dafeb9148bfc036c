//! Errors surfaced by the facade crate.
//!
//! Decrements report [`StockError`] directly. Configuration loading and
//! store administration add their own failures, collected in [`Error`].

use stockguard_storage::StoreError;
use thiserror::Error;

pub use stockguard_core::{StockError, StockResult};

/// Configuration could not be loaded or is inconsistent
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML did not parse or did not match the expected shape
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but rejected by validation
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// All facade errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A decrement failed
    #[error(transparent)]
    Stock(#[from] StockError),

    /// A store administration call failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error may succeed on retry with fresh data.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Stock(e) => e.is_retryable(),
            Error::Store(e) => e.is_version_conflict(),
            Error::Config(_) => false,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Stock(e) => e.is_not_found(),
            Error::Store(StoreError::NotFound(_)) => true,
            _ => false,
        }
    }

    /// The decrement error, if this is one.
    pub fn as_stock(&self) -> Option<&StockError> {
        match self {
            Error::Stock(e) => Some(e),
            _ => None,
        }
    }
}
