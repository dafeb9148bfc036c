//! Facade wiring, validation and metrics.

use crate::*;

#[test]
fn test_invalid_amount_every_mode() {
    for mode in ALL_MODES {
        let facade = facade_with(mode, 10);
        assert_eq!(facade.decrease(ID, 0), Err(StockError::InvalidAmount(0)), "{mode}");
        assert_eq!(facade.record(ID).unwrap().version, 0);
    }
}

#[test]
fn test_not_found_every_mode() {
    for mode in ALL_MODES {
        let facade = facade_with(mode, 10);
        let err = facade.decrease(StockId::new(404), 1).unwrap_err();
        assert!(err.is_not_found(), "{mode}: {err}");
    }
}

#[test]
fn test_insufficient_every_mode() {
    for mode in ALL_MODES {
        let facade = facade_with(mode, 2);
        assert_eq!(
            facade.decrease(ID, 3),
            Err(StockError::InsufficientStock {
                id: ID,
                requested: 3,
                available: 2,
            }),
            "{mode}"
        );
        assert_eq!(facade.quantity(ID), Some(2));
    }
}

#[test]
fn test_shared_lock_manager_between_facades() {
    // Two facades over the same store coordinate through one lock manager
    let store = store_with(40);
    let locks: Arc<dyn NamedLockManager> = Arc::new(MemoryLockManager::new());
    let build = || {
        Arc::new(
            StockFacade::builder(Arc::clone(&store))
                .mode(LockingMode::NamedLock)
                .lock_manager(Arc::clone(&locks))
                .build()
                .unwrap(),
        )
    };
    let left = build();
    let right = build();

    let results = {
        let left = Arc::clone(&left);
        let right = Arc::clone(&right);
        let flip = std::sync::atomic::AtomicBool::new(false);
        run_concurrent(8, 5, move || {
            if flip.fetch_xor(true, std::sync::atomic::Ordering::Relaxed) {
                left.decrease(ID, 1)
            } else {
                right.decrease(ID, 1)
            }
        })
    };

    assert_eq!(successes(&results), 40);
    assert_eq!(store.get(ID).unwrap().quantity, 0);
    assert_eq!(
        left.metrics().decrements_committed + right.metrics().decrements_committed,
        40
    );
    assert!(!locks.is_locked("stock:1").unwrap());
}

#[test]
fn test_retry_metrics_reported() {
    let facade = facade_with(LockingMode::OptimisticRetry, 200);

    let results = {
        let facade = Arc::clone(&facade);
        run_concurrent(10, 20, move || facade.decrease(ID, 1))
    };
    assert_eq!(successes(&results), 200);

    let metrics = facade.metrics();
    assert_eq!(metrics.decrements_committed, 200);
    assert_eq!(metrics.success_rate, 1.0);
    assert_eq!(facade.record(ID).unwrap().version, 200);
}

#[test]
fn test_store_transaction_timeout_surfaces_as_persistence() {
    let store = Arc::new(MemoryStockStore::with_options(
        StoreOptions::default().with_transaction_timeout(Some(Duration::ZERO)),
    ));
    store.insert(ID, 10).unwrap();
    let facade = StockFacade::with_mode(Arc::clone(&store), LockingMode::NamedLock).unwrap();

    let err = facade.decrease(ID, 1).unwrap_err();
    assert!(matches!(err, StockError::Persistence(_)), "{err}");
    assert_eq!(store.get(ID).unwrap().quantity, 10);
    assert!(!store.is_row_locked(ID));

    // A held lock would turn the second call into a lock timeout
    assert!(matches!(facade.decrease(ID, 1), Err(StockError::Persistence(_))));
    assert_eq!(facade.metrics().failures("persistence"), 2);
}

#[test]
fn test_create_and_admin() {
    let facade = facade_with(LockingMode::Pessimistic, 5);
    facade.create(StockId::new(2), 7).unwrap();
    assert_eq!(facade.store().len(), 2);
    assert!(facade.create(StockId::new(2), 1).is_err());

    facade.store().clear();
    assert!(facade.store().is_empty());
    assert_eq!(facade.quantity(ID), None);
}
