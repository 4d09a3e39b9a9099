//! Coordinator-driven scenarios

use crate::common::{key, record};
use softcache::{
    AccessStrategy, AccessType, CacheKey, Coordinator, MemoryRegion, Participant, RegionAccess,
    Result, TxnId, Version,
};
use std::sync::{Arc, Mutex};

/// Coordinator double: remembers participants and lets the test drive the
/// two-phase outcome.
#[derive(Default)]
struct ManualCoordinator {
    enlisted: Mutex<Vec<(TxnId, Arc<dyn Participant>)>>,
}

impl ManualCoordinator {
    fn complete(&self, txn: TxnId, success: bool) {
        let participants: Vec<_> = self
            .enlisted
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == txn)
            .map(|(_, p)| p.clone())
            .collect();
        for participant in participants {
            participant.prepare(txn).unwrap();
            if success {
                participant.commit(txn).unwrap();
            } else {
                participant.rollback(txn).unwrap();
            }
        }
    }
}

impl Coordinator for ManualCoordinator {
    fn enlist(
        &self,
        txn: TxnId,
        _keys: &[CacheKey],
        participant: Arc<dyn Participant>,
    ) -> Result<()> {
        self.enlisted.lock().unwrap().push((txn, participant));
        Ok(())
    }
}

fn setup() -> (AccessStrategy, Arc<ManualCoordinator>) {
    let coordinator = Arc::new(ManualCoordinator::default());
    let strategy = AccessStrategy::for_access_type(
        AccessType::Transactional,
        Arc::new(MemoryRegion::new("accounts")),
        Some(coordinator.clone()),
    )
    .unwrap();
    (strategy, coordinator)
}

#[test]
fn write_visibility_follows_two_phase_outcome() {
    let (strategy, coordinator) = setup();
    let txn = TxnId::new();

    strategy
        .update(txn, &key(1), record(2), Version::new(2), Version::new(1))
        .unwrap();
    assert!(strategy.get(TxnId::new(), &key(1)).unwrap().is_none());

    coordinator.complete(txn, true);
    assert_eq!(strategy.get(TxnId::new(), &key(1)).unwrap(), Some(record(2)));
}

#[test]
fn rollback_leaves_committed_state_untouched() {
    let (strategy, coordinator) = setup();
    let txn = TxnId::new();

    strategy
        .put_from_load(txn, &key(2), record(1), Version::new(1))
        .unwrap();
    strategy
        .update(txn, &key(2), record(2), Version::new(2), Version::new(1))
        .unwrap();
    coordinator.complete(txn, false);

    assert_eq!(strategy.get(TxnId::new(), &key(2)).unwrap(), Some(record(1)));
}

#[test]
fn lock_item_registers_participation() {
    let (strategy, coordinator) = setup();
    let txn = TxnId::new();

    let lock = strategy.lock_item(txn, &key(3), Version::ZERO).unwrap();
    assert!(lock.is_some());
    assert_eq!(coordinator.enlisted.lock().unwrap().len(), 1);

    // Same key again: no second enlistment
    strategy
        .update(txn, &key(3), record(1), Version::new(1), Version::ZERO)
        .unwrap();
    assert_eq!(coordinator.enlisted.lock().unwrap().len(), 1);
}
