//! Loading facade configuration from TOML.

use crate::*;

const NAMED_LOCK_CONFIG: &str = r#"
mode = "named_lock"
lock_timeout_ms = 40
lock_key_prefix = "inv:"
"#;

#[test]
fn test_toml_selects_named_lock_with_prefix() {
    let config = FacadeConfig::from_toml_str(NAMED_LOCK_CONFIG).unwrap();
    let locks = Arc::new(MemoryLockManager::new());
    let facade = StockFacade::builder(store_with(5))
        .config(config)
        .lock_manager(Arc::clone(&locks) as Arc<dyn NamedLockManager>)
        .build()
        .unwrap();
    assert_eq!(facade.mode(), LockingMode::NamedLock);

    // The configured prefix and timeout are the ones in effect
    let held = locks.acquire("inv:1", None).unwrap();
    assert!(matches!(
        facade.decrease(ID, 1),
        Err(StockError::LockTimeout { ref key, .. }) if key == "inv:1"
    ));
    locks.release(&held).unwrap();
    assert_eq!(facade.decrease(ID, 1).unwrap(), 4);
}

#[test]
fn test_toml_retry_budget_reaches_strategy() {
    let config = FacadeConfig::from_toml_str(
        r#"
        mode = "optimistic_retry"

        [retry]
        max_attempts = 2
        backoff_ms = 0
        "#,
    )
    .unwrap();
    assert_eq!(
        config.retry_policy(),
        RetryPolicy::default()
            .with_max_attempts(2)
            .with_backoff(Duration::ZERO)
    );

    let facade = StockFacade::builder(store_with(1)).config(config).build().unwrap();
    assert_eq!(facade.mode(), LockingMode::OptimisticRetry);
    assert_eq!(facade.decrease(ID, 1).unwrap(), 0);
}

#[test]
fn test_builder_overrides_loaded_config() {
    let config = FacadeConfig::from_toml_str("mode = \"optimistic\"").unwrap();
    let facade = StockFacade::builder(store_with(1))
        .config(config)
        .mode(LockingMode::Pessimistic)
        .build()
        .unwrap();
    assert_eq!(facade.mode(), LockingMode::Pessimistic);
}

#[test]
fn test_bad_documents_rejected() {
    for source in [
        "mode = 3",
        "mode = \"eventual\"",
        "lock_timeout_ms = -1",
        "[retry]\nmax_attempts = 0",
        "surprise = true",
    ] {
        assert!(FacadeConfig::from_toml_str(source).is_err(), "{source}");
    }
}

#[test]
fn test_missing_timeout_waits_indefinitely() {
    let config = FacadeConfig {
        lock_timeout: None,
        ..FacadeConfig::with_mode(LockingMode::NamedLock)
    };
    assert_eq!(config.lock_timeout(), None);
    assert!(config.validate().is_ok());
}
