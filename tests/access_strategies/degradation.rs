//! Backend-failure behavior: reads degrade, mandatory maintenance does not

use crate::common::{key, record, FaultRegion};
use softcache::{
    AccessStrategy, AccessType, Error, Region, RegionAccess, TransactionObserver, TxnId, Version,
};
use std::sync::atomic::Ordering;

fn strategy_over(access: AccessType, region: &std::sync::Arc<FaultRegion>) -> AccessStrategy {
    AccessStrategy::for_access_type(access, region.clone(), None).unwrap()
}

#[test]
fn reads_degrade_to_miss_when_backend_fails() {
    let region = FaultRegion::new();
    let txn = TxnId::new();

    for access in [
        AccessType::ReadOnly,
        AccessType::ReadWrite,
        AccessType::NonstrictReadWrite,
    ] {
        let strategy = strategy_over(access, &region);
        strategy
            .put_from_load(txn, &key(1), record(1), Version::new(1))
            .unwrap();

        region.fail_gets.store(true, Ordering::SeqCst);
        assert!(
            strategy.get(txn, &key(1)).unwrap().is_none(),
            "{access} should degrade a failed read to a miss"
        );
        region.fail_gets.store(false, Ordering::SeqCst);
        assert_eq!(strategy.get(txn, &key(1)).unwrap(), Some(record(1)));
        region.clear().unwrap();
    }
}

#[test]
fn load_put_is_best_effort() {
    let region = FaultRegion::new();
    let strategy = strategy_over(AccessType::ReadWrite, &region);
    let txn = TxnId::new();

    region.fail_puts.store(true, Ordering::SeqCst);
    assert!(!strategy
        .put_from_load(txn, &key(2), record(1), Version::new(1))
        .unwrap());

    region.fail_puts.store(false, Ordering::SeqCst);
    assert!(strategy.get(txn, &key(2)).unwrap().is_none());
}

#[test]
fn nonstrict_invalidation_failure_propagates() {
    let region = FaultRegion::new();
    let strategy = strategy_over(AccessType::NonstrictReadWrite, &region);
    let txn = TxnId::new();

    strategy
        .put_from_load(txn, &key(3), record(1), Version::new(1))
        .unwrap();

    region.fail_removes.store(true, Ordering::SeqCst);
    let err = strategy
        .update(txn, &key(3), record(2), Version::new(2), Version::new(1))
        .unwrap_err();
    assert!(matches!(err, Error::Region { .. }));
}

#[test]
fn lock_placement_failure_propagates() {
    let region = FaultRegion::new();
    let strategy = strategy_over(AccessType::ReadWrite, &region);
    let txn = TxnId::new();

    region.fail_puts.store(true, Ordering::SeqCst);
    let err = strategy.lock_item(txn, &key(4), Version::ZERO).unwrap_err();
    assert!(matches!(err, Error::Region { .. }));
}

#[test]
fn completion_invalidation_failure_is_retryable() {
    let region = FaultRegion::new();
    let strategy = strategy_over(AccessType::NonstrictReadWrite, &region);
    let (writer, loader) = (TxnId::new(), TxnId::new());

    strategy
        .update(writer, &key(10), record(1), Version::new(2), Version::new(1))
        .unwrap();
    strategy
        .update(writer, &key(11), record(1), Version::new(2), Version::new(1))
        .unwrap();
    // Concurrent load repopulates one key inside the accepted window
    strategy
        .put_from_load(loader, &key(11), record(9), Version::new(1))
        .unwrap();

    region.fail_removes.store(true, Ordering::SeqCst);
    let err = strategy.after_completion(writer, true).unwrap_err();
    assert!(matches!(err, Error::Region { .. }));

    // The failed delivery kept its bookkeeping: a retry finishes the
    // mandatory second-leg invalidation for every key.
    region.fail_removes.store(false, Ordering::SeqCst);
    strategy.after_completion(writer, true).unwrap();
    assert!(strategy.get(loader, &key(10)).unwrap().is_none());
    assert!(strategy.get(loader, &key(11)).unwrap().is_none());
}

#[test]
fn completion_lock_release_failure_is_retryable() {
    let region = FaultRegion::new();
    let strategy = strategy_over(AccessType::ReadWrite, &region);
    let txn = TxnId::new();

    strategy
        .put_from_load(txn, &key(12), record(7), Version::new(1))
        .unwrap();
    strategy.lock_item(txn, &key(12), Version::new(1)).unwrap();

    // Restoring the displaced value needs a put; fail it mid-release
    region.fail_puts.store(true, Ordering::SeqCst);
    let err = strategy.after_completion(txn, false).unwrap_err();
    assert!(matches!(err, Error::Region { .. }));

    // The token survived the failed delivery, so the retry can still
    // release the lock and restore the displaced value.
    region.fail_puts.store(false, Ordering::SeqCst);
    strategy.after_completion(txn, false).unwrap();
    assert_eq!(strategy.get(txn, &key(12)).unwrap(), Some(record(7)));
}
