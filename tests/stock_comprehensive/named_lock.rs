//! Named lock strategy: lock scope encloses the transaction scope.

use crate::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use stockguard::NamedLockStrategy;
use stockguard_storage::StoreError;

const KEY: &str = "stock:1";

fn strategy_over<S: StockStore>(
    store: Arc<S>,
    locks: Arc<MemoryLockManager>,
    timeout: Option<Duration>,
) -> NamedLockStrategy<S, MemoryLockManager> {
    NamedLockStrategy::new(store, locks, timeout)
}

#[test]
fn test_lock_held_while_transaction_commits() {
    let locks = Arc::new(MemoryLockManager::new());
    let observed = Arc::new(Mutex::new(Vec::new()));

    let store = {
        let locks = Arc::clone(&locks);
        let observed = Arc::clone(&observed);
        Arc::new(HookedStore::new(10).before_commit(Box::new(
            move |_: &MemoryStockStore, _: &TransactionContext| {
                // Another caller must not be able to take the lock mid-commit
                let held = locks.is_locked(KEY).unwrap_or(false);
                let stolen = locks.try_acquire(KEY).is_ok();
                observed.lock().push((held, stolen));
                Ok(())
            },
        )))
    };
    let strategy = strategy_over(Arc::clone(&store), Arc::clone(&locks), None);

    assert_eq!(strategy.decrease(ID, 1).unwrap(), 9);
    assert_eq!(*observed.lock(), vec![(true, false)]);
    assert!(!locks.is_locked(KEY).unwrap());
}

#[test]
fn test_failed_commit_releases_lock() {
    let locks = Arc::new(MemoryLockManager::new());
    let fail = Arc::new(AtomicBool::new(true));
    let store = {
        let fail = Arc::clone(&fail);
        Arc::new(HookedStore::new(10).before_commit(Box::new(
            move |_: &MemoryStockStore, _: &TransactionContext| {
                if fail.load(Ordering::SeqCst) {
                    Err(StoreError::Backend("disk full".to_string()))
                } else {
                    Ok(())
                }
            },
        )))
    };
    let strategy = strategy_over(
        Arc::clone(&store),
        Arc::clone(&locks),
        Some(Duration::from_millis(100)),
    );

    let err = strategy.decrease(ID, 1).unwrap_err();
    assert_eq!(err, StockError::Persistence("backend error: disk full".to_string()));
    assert!(!locks.is_locked(KEY).unwrap());
    assert!(!store.inner.is_row_locked(ID));
    assert_eq!(store.get(ID).unwrap().quantity, 10);

    // The next caller acquires immediately and succeeds
    fail.store(false, Ordering::SeqCst);
    assert_eq!(strategy.decrease(ID, 1).unwrap(), 9);
}

#[test]
fn test_business_failure_releases_lock() {
    let store = store_with(2);
    let locks = Arc::new(MemoryLockManager::new());
    let strategy = strategy_over(Arc::clone(&store), Arc::clone(&locks), None);

    assert!(matches!(
        strategy.decrease(ID, 3),
        Err(StockError::InsufficientStock { .. })
    ));
    assert!(matches!(
        strategy.decrease(StockId::new(42), 1),
        Err(StockError::NotFound { .. })
    ));
    assert_eq!(locks.held_count(), 0);
    assert!(locks.try_acquire(KEY).is_ok());
}

#[test]
fn test_lock_timeout_never_opens_transaction() {
    let opened = Arc::new(AtomicBool::new(false));
    let store = {
        let opened = Arc::clone(&opened);
        Arc::new(HookedStore::new(10).before_commit(Box::new(
            move |_: &MemoryStockStore, _: &TransactionContext| {
                opened.store(true, Ordering::SeqCst);
                Ok(())
            },
        )))
    };
    let locks = Arc::new(MemoryLockManager::new());
    let strategy = strategy_over(
        Arc::clone(&store),
        Arc::clone(&locks),
        Some(Duration::from_millis(25)),
    );

    let held = locks.acquire(KEY, None).unwrap();
    let err = strategy.decrease(ID, 1).unwrap_err();
    assert!(matches!(
        err,
        StockError::LockTimeout { ref key, waited_ms } if key == KEY && waited_ms >= 25
    ));
    assert!(!opened.load(Ordering::SeqCst));
    assert_eq!(store.get(ID).unwrap().version, 0);

    // The outside holder still owns the lock
    assert!(locks.is_locked(KEY).unwrap());
    locks.release(&held).unwrap();
}

#[test]
fn test_unreachable_lock_service() {
    let store = store_with(10);
    let locks = Arc::new(MemoryLockManager::new());
    let strategy = strategy_over(Arc::clone(&store), Arc::clone(&locks), None);
    locks.close();

    let err = strategy.decrease(ID, 1).unwrap_err();
    assert!(err.is_lock_failure());
    assert!(matches!(err, StockError::LockAcquisitionFailed { .. }));
    assert_eq!(store.get(ID).unwrap().quantity, 10);
}

#[test]
fn test_waiter_proceeds_after_release() {
    let store = store_with(10);
    let locks = Arc::new(MemoryLockManager::new());
    let strategy = Arc::new(strategy_over(
        Arc::clone(&store),
        Arc::clone(&locks),
        Some(Duration::from_secs(5)),
    ));

    let held = locks.acquire(KEY, None).unwrap();
    let waiter = {
        let strategy = Arc::clone(&strategy);
        thread::spawn(move || strategy.decrease(ID, 4))
    };

    thread::sleep(Duration::from_millis(30));
    assert_eq!(store.get(ID).unwrap().quantity, 10);
    locks.release(&held).unwrap();

    assert_eq!(waiter.join().unwrap().unwrap(), 6);
    assert_eq!(locks.held_count(), 0);
}

#[test]
fn test_distinct_ids_do_not_block_each_other() {
    let store = store_with(10);
    store.insert(StockId::new(2), 10).unwrap();
    let locks = Arc::new(MemoryLockManager::new());
    let strategy = strategy_over(
        Arc::clone(&store),
        Arc::clone(&locks),
        Some(Duration::from_millis(10)),
    );

    let _held = locks.acquire(KEY, None).unwrap();
    assert_eq!(strategy.decrease(StockId::new(2), 3).unwrap(), 7);
}

#[test]
fn test_contention_conserves_quantity() {
    let store = store_with(150);
    let locks = Arc::new(MemoryLockManager::new());
    let strategy = Arc::new(strategy_over(
        Arc::clone(&store),
        Arc::clone(&locks),
        Some(Duration::from_secs(30)),
    ));

    let results = {
        let strategy = Arc::clone(&strategy);
        run_concurrent(15, 10, move || strategy.decrease(ID, 1))
    };

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(store.get(ID).unwrap().quantity, 0);
    assert_eq!(locks.held_count(), 0);
}
