//! Property tests for pool invariants.
//!
//! After any sequence of operations the pool never holds more than
//! `max_size` handles, every bound key maps to a handle carrying that key,
//! and a key is bound to at most one handle.

use std::collections::HashSet;

use proptest::prelude::*;
use reel_pool::testing::MockPlayer;
use reel_pool::{PlayerKey, PlayerPool};

#[derive(Debug, Clone)]
enum Op {
    Acquire(u8),
    AcquireFree(u8),
    AcquireOldest(u8),
    Add(u8),
    Get(u8),
    Unregister(u8),
    Release(u8),
    Remove(u8),
    Attach(u8, bool),
    ReleaseAll,
}

fn arb_op() -> impl Strategy<Value = Op> {
    let k = 0u8..6;
    prop_oneof![
        4 => k.clone().prop_map(Op::Acquire),
        2 => k.clone().prop_map(Op::AcquireFree),
        1 => k.clone().prop_map(Op::AcquireOldest),
        3 => k.clone().prop_map(Op::Add),
        2 => k.clone().prop_map(Op::Get),
        2 => k.clone().prop_map(Op::Unregister),
        1 => k.clone().prop_map(Op::Release),
        1 => k.clone().prop_map(Op::Remove),
        1 => (k, any::<bool>()).prop_map(|(k, a)| Op::Attach(k, a)),
        1 => Just(Op::ReleaseAll),
    ]
}

fn key(k: u8) -> PlayerKey {
    PlayerKey::new(format!("item-{k}")).unwrap()
}

fn apply(pool: &mut PlayerPool<MockPlayer>, op: &Op) {
    match op {
        Op::Acquire(k) => {
            pool.acquire(&key(*k));
        }
        Op::AcquireFree(k) => {
            pool.acquire_free(&key(*k));
        }
        Op::AcquireOldest(k) => {
            pool.acquire_oldest(&key(*k));
        }
        Op::Add(k) => {
            let _ = pool.add_player(&key(*k), MockPlayer::new());
        }
        Op::Get(k) => {
            pool.get(&key(*k));
        }
        Op::Unregister(k) => {
            pool.unregister(&key(*k));
        }
        Op::Release(k) => {
            pool.release(&key(*k));
        }
        Op::Remove(k) => {
            pool.remove(&key(*k));
        }
        Op::Attach(k, attached) => {
            if let Some(handle) = pool.get(&key(*k)) {
                handle.player().set_attached(*attached);
            }
        }
        Op::ReleaseAll => pool.release_all(),
    }
}

fn check_invariants(pool: &PlayerPool<MockPlayer>) -> Result<(), TestCaseError> {
    prop_assert!(pool.count() <= pool.max_size());

    let mut seen = HashSet::new();
    let mut bound = 0;
    for handle in pool.handles() {
        if let Some(k) = handle.key() {
            bound += 1;
            prop_assert!(seen.insert(k.clone()), "key {k} bound twice");
            prop_assert!(pool.contains(k), "bound key {k} missing from index");
        }
    }
    prop_assert_eq!(pool.stats().bound, bound);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_after_every_op(
        max_size in 0usize..5,
        ops in proptest::collection::vec(arb_op(), 1..60),
    ) {
        let mut pool = PlayerPool::new(max_size);
        for op in &ops {
            apply(&mut pool, op);
            check_invariants(&pool)?;
        }
    }

    #[test]
    fn acquire_binds_unless_pool_is_empty(
        max_size in 1usize..5,
        keys in proptest::collection::vec(0u8..8, 1..20),
    ) {
        let mut pool = PlayerPool::new(max_size);
        pool.add_player(&key(100), MockPlayer::new()).unwrap();

        for k in keys {
            let handle = pool.acquire(&key(k));
            prop_assert!(handle.is_some());
            prop_assert!(pool.contains(&key(k)));
        }
        prop_assert_eq!(pool.count(), 1);
    }
}
