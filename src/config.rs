//! Facade configuration.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! mode = "optimistic_retry"      # pessimistic | optimistic | optimistic_retry | named_lock
//! lock_timeout_ms = 3000         # named lock wait; omit to wait forever
//! lock_key_prefix = "stock:"
//!
//! [retry]
//! max_attempts = 10
//! backoff_ms = 50
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stockguard_concurrency::named::DEFAULT_KEY_PREFIX;
use stockguard_concurrency::{LockingMode, RetryPolicy};

/// Default wait for the named lock, in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 3_000;

/// Retry budget as it appears in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Fixed pause between attempts, in milliseconds
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryPolicy::default().into()
    }
}

impl From<RetryPolicy> for RetryConfig {
    fn from(policy: RetryPolicy) -> Self {
        RetryConfig {
            max_attempts: policy.max_attempts,
            backoff_ms: policy.backoff.as_millis() as u64,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::default()
            .with_max_attempts(config.max_attempts)
            .with_backoff(Duration::from_millis(config.backoff_ms))
    }
}

/// How a [`StockFacade`](crate::StockFacade) guards its decrements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacadeConfig {
    /// Locking discipline
    pub mode: LockingMode,
    /// Retry budget, used by `optimistic_retry`
    pub retry: RetryConfig,
    /// Named lock wait in milliseconds; `None` waits indefinitely
    #[serde(rename = "lock_timeout_ms")]
    pub lock_timeout: Option<u64>,
    /// Prefix of named lock keys
    pub lock_key_prefix: String,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        FacadeConfig {
            mode: LockingMode::default(),
            retry: RetryConfig::default(),
            lock_timeout: Some(DEFAULT_LOCK_TIMEOUT_MS),
            lock_key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl FacadeConfig {
    /// Default configuration with the given mode
    pub fn with_mode(mode: LockingMode) -> Self {
        FacadeConfig {
            mode,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: FacadeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no strategy can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.lock_key_prefix.len() >= stockguard_locks::manager::MAX_KEY_LEN {
            return Err(ConfigError::Invalid(format!(
                "lock_key_prefix longer than {} bytes",
                stockguard_locks::manager::MAX_KEY_LEN - 1
            )));
        }
        Ok(())
    }

    /// Named lock wait as a duration
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout.map(Duration::from_millis)
    }

    /// Retry budget as a policy
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }
}
