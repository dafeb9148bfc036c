//! Optimistic strategy and its retrying wrapper.

use crate::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use stockguard::{OptimisticStrategy, RetryingStrategy};
use stockguard_storage::StoreError;

#[test]
fn test_two_readers_one_winner() {
    let store = store_with(10);

    // Both transactions read version 0
    let mut first = store.begin();
    let mut second = store.begin();
    let a = store.fetch(&first, ID).unwrap();
    let b = store.fetch(&second, ID).unwrap();
    assert_eq!(a.version, 0);
    assert_eq!(b.version, 0);

    let mut a_next = a.clone();
    a_next.quantity -= 1;
    store.write_versioned(&mut first, &a_next).unwrap();
    store.commit(&mut first).unwrap();

    let mut b_next = b.clone();
    b_next.quantity -= 1;
    let err = store.write_versioned(&mut second, &b_next).unwrap_err();
    assert_eq!(
        err,
        StoreError::VersionConflict {
            id: ID,
            expected: 0,
            actual: 1,
        }
    );
    assert!(matches!(
        StockError::from(err),
        StockError::ConcurrentModification {
            expected_version: 0,
            actual_version: 1,
            ..
        }
    ));
    store.rollback(&mut second);

    let record = store.get(ID).unwrap();
    assert_eq!(record.quantity, 9);
    assert_eq!(record.version, 1);
}

#[test]
fn test_conflict_is_never_retried_implicitly() {
    let store = store_with(1_000);
    let strategy = Arc::new(OptimisticStrategy::new(Arc::clone(&store)));

    let results = {
        let strategy = Arc::clone(&strategy);
        run_concurrent(16, 20, move || strategy.decrease(ID, 1))
    };

    let ok = successes(&results);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(err.is_retryable(), "unexpected error {err}");
    }
    assert_eq!(strategy.retries(), 0);
    let record = store.get(ID).unwrap();
    assert_eq!(record.quantity, 1_000 - ok);
    assert_eq!(record.version, ok);
}

#[test]
fn test_retrying_wrapper_completes_every_call() {
    let store = store_with(400);
    let strategy = Arc::new(RetryingStrategy::new(
        OptimisticStrategy::new(Arc::clone(&store)),
        generous_retry(),
    ));
    assert_eq!(strategy.mode(), LockingMode::OptimisticRetry);

    let results = {
        let strategy = Arc::clone(&strategy);
        run_concurrent(8, 50, move || strategy.decrease(ID, 1))
    };

    assert!(results.iter().all(|r| r.is_ok()));
    let record = store.get(ID).unwrap();
    assert_eq!(record.quantity, 0);
    assert_eq!(record.version, 400);
}

#[test]
fn test_retrying_wrapper_gives_up_with_attempt_count() {
    // A rival commits between every read and write, so every attempt conflicts
    let store = Arc::new(HookedStore::new(100).after_fetch(Box::new(
        |inner: &MemoryStockStore, _: &TransactionContext| commit_rival(inner),
    )));
    let strategy = RetryingStrategy::new(
        OptimisticStrategy::new(Arc::clone(&store)),
        RetryPolicy::default()
            .with_max_attempts(3)
            .with_backoff(Duration::ZERO),
    );

    assert_eq!(
        strategy.decrease(ID, 1),
        Err(StockError::RetriesExhausted { id: ID, attempts: 3 })
    );
    assert_eq!(strategy.retries(), 2);

    // Only the three rival decrements landed
    let record = store.get(ID).unwrap();
    assert_eq!(record.quantity, 97);
    assert_eq!(record.version, 3);
    assert!(!store.inner.is_row_locked(ID));
}

#[test]
fn test_single_rival_is_absorbed_by_retry() {
    let pending_rival = AtomicBool::new(true);
    let store = Arc::new(HookedStore::new(10).after_fetch(Box::new(
        move |inner: &MemoryStockStore, _: &TransactionContext| {
            if pending_rival.swap(false, Ordering::SeqCst) {
                commit_rival(inner)?;
            }
            Ok(())
        },
    )));
    let strategy = RetryingStrategy::new(
        OptimisticStrategy::new(Arc::clone(&store)),
        RetryPolicy::default().with_backoff(Duration::ZERO),
    );

    assert_eq!(strategy.decrease(ID, 1).unwrap(), 8);
    assert_eq!(strategy.retries(), 1);
    assert_eq!(store.get(ID).unwrap().version, 2);
}

#[test]
fn test_uncommitted_writer_fails_fast_then_retry_absorbs() {
    let store = Arc::new(MemoryStockStore::with_options(
        StoreOptions::default().with_lock_wait_timeout(Some(Duration::from_millis(300))),
    ));
    store.insert(ID, 10).unwrap();

    // A writer sits between write_versioned and commit
    let mut pending = store.begin();
    let mut next = store.fetch(&pending, ID).unwrap();
    next.quantity -= 1;
    store.write_versioned(&mut pending, &next).unwrap();

    let plain = OptimisticStrategy::new(Arc::clone(&store));
    let started = Instant::now();
    let err = plain.decrease(ID, 1).unwrap_err();
    assert!(started.elapsed() < Duration::from_millis(50), "waited {:?}", started.elapsed());
    assert!(
        matches!(err, StockError::ConcurrentModification { .. }),
        "unexpected error {err}"
    );

    let retrying = Arc::new(RetryingStrategy::new(
        OptimisticStrategy::new(Arc::clone(&store)),
        RetryPolicy::default()
            .with_max_attempts(200)
            .with_backoff(Duration::from_millis(2)),
    ));
    let caller = {
        let retrying = Arc::clone(&retrying);
        thread::spawn(move || retrying.decrease(ID, 1))
    };

    thread::sleep(Duration::from_millis(30));
    store.commit(&mut pending).unwrap();

    assert_eq!(caller.join().unwrap().unwrap(), 8);
    let record = store.get(ID).unwrap();
    assert_eq!((record.quantity, record.version), (8, 2));
}
