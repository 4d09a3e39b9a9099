//! Invalidation-bracketing scenarios

use crate::common::{key, record};
use softcache::{
    AccessStrategy, AccessType, MemoryRegion, RegionAccess, TransactionObserver, TxnId, Version,
};
use std::sync::Arc;

fn strategy() -> AccessStrategy {
    AccessStrategy::for_access_type(
        AccessType::NonstrictReadWrite,
        Arc::new(MemoryRegion::new("audit")),
        None,
    )
    .unwrap()
}

#[test]
fn update_invalidates_before_and_after_completion() {
    let strategy = strategy();
    let txn = TxnId::new();

    strategy
        .put_from_load(txn, &key(1), record(1), Version::new(1))
        .unwrap();

    strategy
        .update(txn, &key(1), record(2), Version::new(2), Version::new(1))
        .unwrap();
    // Gone immediately
    assert!(strategy.get(txn, &key(1)).unwrap().is_none());

    strategy
        .after_update(txn, &key(1), record(2), Version::new(2), Version::new(1), None)
        .unwrap();
    strategy.after_completion(txn, true).unwrap();

    // Still gone: no proactive repopulation from the local write
    assert!(strategy.get(txn, &key(1)).unwrap().is_none());

    // The next reader repairs the cache with a fresh load
    assert!(strategy
        .put_from_load(txn, &key(1), record(2), Version::new(2))
        .unwrap());
    assert_eq!(strategy.get(txn, &key(1)).unwrap(), Some(record(2)));
}

#[test]
fn accepted_window_is_closed_by_second_invalidation() {
    let strategy = strategy();
    let (writer, loader) = (TxnId::new(), TxnId::new());

    strategy
        .update(writer, &key(2), record(2), Version::ZERO, Version::ZERO)
        .unwrap();

    // Concurrent load lands inside the window and is served...
    strategy
        .put_from_load(loader, &key(2), record(1), Version::new(1))
        .unwrap();
    assert_eq!(strategy.get(loader, &key(2)).unwrap(), Some(record(1)));

    // ...until the writer's completion closes the window
    strategy.after_completion(writer, true).unwrap();
    assert!(strategy.get(loader, &key(2)).unwrap().is_none());
}

#[test]
fn rollback_still_invalidates() {
    let strategy = strategy();
    let txn = TxnId::new();

    strategy
        .put_from_load(txn, &key(3), record(1), Version::new(1))
        .unwrap();
    strategy
        .update(txn, &key(3), record(2), Version::new(2), Version::new(1))
        .unwrap();
    strategy.after_completion(txn, false).unwrap();

    assert!(strategy.get(txn, &key(3)).unwrap().is_none());
}
