//! Soft-lock protocol scenarios through the facade

use crate::common::{key, record};
use softcache::{
    AccessStrategy, AccessType, MemoryRegion, RegionAccess, TransactionObserver, TxnId, Version,
};
use std::sync::Arc;

fn strategy() -> AccessStrategy {
    AccessStrategy::for_access_type(
        AccessType::ReadWrite,
        Arc::new(MemoryRegion::new("orders")),
        None,
    )
    .unwrap()
}

#[test]
fn lock_by_one_transaction_forces_miss_for_another() {
    let strategy = strategy();
    let (t1, t2) = (TxnId::new(), TxnId::new());

    strategy
        .put_from_load(t1, &key(1), record(1), Version::new(1))
        .unwrap();
    strategy.lock_item(t1, &key(1), Version::new(1)).unwrap();

    assert!(strategy.get(t2, &key(1)).unwrap().is_none());

    // T2's competing lock does not transition the key out of T1's ownership:
    // after T2 rolls back, T1's rollback still restores the original value.
    strategy.lock_item(t2, &key(1), Version::new(1)).unwrap();
    strategy.after_completion(t2, false).unwrap();
    assert!(strategy.get(t2, &key(1)).unwrap().is_none());

    strategy.after_completion(t1, false).unwrap();
    assert_eq!(strategy.get(t2, &key(1)).unwrap(), Some(record(1)));
}

#[test]
fn reentrant_lock_releases_pairwise() {
    let strategy = strategy();
    let txn = TxnId::new();

    strategy
        .put_from_load(txn, &key(1), record(7), Version::new(1))
        .unwrap();
    let first = strategy
        .lock_item(txn, &key(1), Version::new(1))
        .unwrap()
        .unwrap();
    let second = strategy
        .lock_item(txn, &key(1), Version::new(1))
        .unwrap()
        .unwrap();

    strategy.unlock_item(txn, &key(1), first).unwrap();
    assert!(strategy.get(txn, &key(1)).unwrap().is_none());
    strategy.unlock_item(txn, &key(1), second).unwrap();
    assert_eq!(strategy.get(txn, &key(1)).unwrap(), Some(record(7)));
}

#[test]
fn insert_confirm_read_cycle() {
    let strategy = strategy();
    let txn = TxnId::new();

    strategy.insert(txn, &key(2), record(2), Version::new(1)).unwrap();
    strategy
        .after_insert(txn, &key(2), record(2), Version::new(1))
        .unwrap();
    strategy.after_completion(txn, true).unwrap();

    assert_eq!(strategy.get(TxnId::new(), &key(2)).unwrap(), Some(record(2)));
}

#[test]
fn stale_after_update_is_discarded() {
    let strategy = strategy();
    let (t1, t2) = (TxnId::new(), TxnId::new());

    strategy
        .update(t1, &key(3), record(5), Version::new(5), Version::new(4))
        .unwrap();
    strategy
        .after_update(t1, &key(3), record(5), Version::new(5), Version::new(4), None)
        .unwrap();
    strategy.after_completion(t1, true).unwrap();

    strategy
        .update(t2, &key(3), record(3), Version::new(3), Version::new(2))
        .unwrap();
    strategy
        .after_update(t2, &key(3), record(3), Version::new(3), Version::new(2), None)
        .unwrap();
    strategy.after_completion(t2, true).unwrap();

    assert_eq!(strategy.get(TxnId::new(), &key(3)).unwrap(), Some(record(5)));
}

#[test]
fn rollback_without_update_restores_prior_value() {
    let strategy = strategy();
    let txn = TxnId::new();

    strategy
        .put_from_load(txn, &key(4), record(9), Version::new(1))
        .unwrap();
    strategy.lock_item(txn, &key(4), Version::new(1)).unwrap();
    strategy.after_completion(txn, false).unwrap();

    assert_eq!(strategy.get(TxnId::new(), &key(4)).unwrap(), Some(record(9)));
}

#[test]
fn operations_on_distinct_keys_do_not_interfere() {
    let strategy = Arc::new(strategy());
    let seed = TxnId::new();
    for id in 0..8 {
        strategy
            .put_from_load(seed, &key(id), record(id as u8), Version::new(1))
            .unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|id| {
            let strategy = strategy.clone();
            std::thread::spawn(move || {
                let txn = TxnId::new();
                strategy
                    .update(
                        txn,
                        &key(id),
                        record(100 + id as u8),
                        Version::new(2),
                        Version::new(1),
                    )
                    .unwrap();
                strategy
                    .after_update(
                        txn,
                        &key(id),
                        record(100 + id as u8),
                        Version::new(2),
                        Version::new(1),
                        None,
                    )
                    .unwrap();
                strategy.after_completion(txn, true).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let reader = TxnId::new();
    for id in 0..8 {
        assert_eq!(
            strategy.get(reader, &key(id)).unwrap(),
            Some(record(100 + id as u8))
        );
    }
}

#[test]
fn concurrent_writers_on_one_key_leave_a_single_winner() {
    let strategy = Arc::new(strategy());

    let handles: Vec<_> = (1..=4u64)
        .map(|version| {
            let strategy = strategy.clone();
            std::thread::spawn(move || {
                let txn = TxnId::new();
                strategy
                    .update(
                        txn,
                        &key(9),
                        record(version as u8),
                        Version::new(version),
                        Version::new(version - 1),
                    )
                    .unwrap();
                strategy
                    .after_update(
                        txn,
                        &key(9),
                        record(version as u8),
                        Version::new(version),
                        Version::new(version - 1),
                        None,
                    )
                    .unwrap();
                strategy.after_completion(txn, true).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Whatever the interleaving, the surviving entry (if any) is readable,
    // never a leaked lock: a subsequent load must be able to refresh it.
    let txn = TxnId::new();
    if strategy.get(txn, &key(9)).unwrap().is_none() {
        assert!(strategy
            .put_from_load(txn, &key(9), record(42), Version::new(42))
            .unwrap());
        assert_eq!(strategy.get(txn, &key(9)).unwrap(), Some(record(42)));
    }
}
