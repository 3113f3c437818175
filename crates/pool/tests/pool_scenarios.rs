//! Acquisition, eviction and release scenarios for `PlayerPool`.

use std::sync::Arc;

use reel_pool::testing::{MockDelegate, MockPlayer};
use reel_pool::{AttachmentDelegate, Player, PlayerHandle, PlayerKey, PlayerPool};
use rstest::rstest;

fn key(s: &str) -> PlayerKey {
    PlayerKey::new(s).unwrap()
}

/// Acquire `k`, creating a player when the pool still has room, the way
/// the provider does.
fn acquire_or_add(pool: &mut PlayerPool<MockPlayer>, k: &PlayerKey) -> Arc<MockPlayer> {
    if let Some(player) = pool.acquire_free(k).map(|h| Arc::clone(h.player())) {
        return player;
    }
    if pool.is_full() {
        return Arc::clone(pool.acquire(k).expect("full pool has a handle").player());
    }
    Arc::clone(pool.add_player(k, MockPlayer::new()).unwrap().player())
}

/// Attach `player` to a fresh target the way a view would.
fn attach(player: &MockPlayer) -> Arc<MockDelegate> {
    let delegate = MockDelegate::new();
    delegate.on_attach();
    let shared: Arc<dyn AttachmentDelegate> = delegate.clone();
    player.set_attachment_delegate(Some(shared));
    player.set_attached(true);
    assert!(player.has_delegate());
    delegate
}

// ---------------------------------------------------------------------------
// Filling up
// ---------------------------------------------------------------------------

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn count_tracks_distinct_keys_until_full(#[case] max_size: usize) {
    let mut pool = PlayerPool::new(max_size);

    for i in 0..max_size {
        assert!(!pool.is_full());
        acquire_or_add(&mut pool, &key(&format!("k{i}")));
        assert_eq!(pool.count(), i + 1);
    }
    assert!(pool.is_full());
}

#[test]
fn acquire_then_get_returns_same_player() {
    let mut pool = PlayerPool::new(2);
    let acquired = acquire_or_add(&mut pool, &key("a"));
    let got = pool.get(&key("a")).unwrap();
    assert!(Arc::ptr_eq(&acquired, got.player()));
}

// ---------------------------------------------------------------------------
// Eviction
// ---------------------------------------------------------------------------

#[test]
fn full_pool_evicts_first_acquired() {
    let mut pool = PlayerPool::new(2);
    let a = acquire_or_add(&mut pool, &key("a"));
    acquire_or_add(&mut pool, &key("b"));
    assert_eq!(pool.count(), 2);
    assert!(pool.is_full());

    let before = pool.handles().map(|h| h.last_access()).max().unwrap();
    let handle = pool.acquire(&key("c")).unwrap();
    assert!(Arc::ptr_eq(handle.player(), &a));
    assert!(handle.last_access() > before);

    assert!(!pool.contains(&key("a")));
    assert!(pool.contains(&key("b")));
    assert!(pool.contains(&key("c")));
    assert_eq!(pool.count(), 2);
}

#[test]
fn eviction_picks_minimum_access_stamp() {
    let mut pool = PlayerPool::new(3);
    for k in ["a", "b", "c"] {
        acquire_or_add(&mut pool, &key(k));
    }
    pool.get(&key("a"));
    pool.get(&key("c"));

    let oldest = pool
        .handles()
        .min_by_key(|h| h.last_access())
        .map(|h| h.id())
        .unwrap();
    let handle = pool.acquire(&key("d")).unwrap();
    assert_eq!(handle.id(), oldest);
    assert!(!pool.contains(&key("b")));
}

#[test]
fn evicted_player_is_fully_detached() {
    let mut pool = PlayerPool::new(1);
    let a = acquire_or_add(&mut pool, &key("a"));
    let delegate = attach(&a);

    pool.acquire(&key("b")).unwrap();
    assert!(!a.has_delegate());
    assert_eq!(Arc::strong_count(&delegate), 1);
    assert_eq!(a.stop_count(), 1);
    assert_eq!(a.detached_event_count(), 1);
    assert_eq!(a.listener_clear_count(), 1);
    assert_eq!(a.release_count(), 0);
}

// ---------------------------------------------------------------------------
// Unregister and free reuse
// ---------------------------------------------------------------------------

#[test]
fn unregistered_player_is_handed_to_next_key() {
    let mut pool = PlayerPool::new(1);
    let x = acquire_or_add(&mut pool, &key("x"));
    let delegate = attach(&x);
    delegate.on_detach();
    x.set_attached(false);
    pool.unregister(&key("x"));
    assert!(!x.has_delegate());

    let handle = pool.acquire_free(&key("y")).unwrap();
    assert!(Arc::ptr_eq(handle.player(), &x));
    assert_eq!(handle.key(), Some(&key("y")));
    assert!(!pool.contains(&key("x")));
}

#[test]
fn unregister_twice_leaves_count_unchanged() {
    let mut pool = PlayerPool::new(2);
    acquire_or_add(&mut pool, &key("a"));
    assert!(pool.unregister(&key("a")));
    let count = pool.count();
    assert!(!pool.unregister(&key("a")));
    assert_eq!(pool.count(), count);
}

#[test]
fn acquire_free_never_evicts() {
    let mut pool = PlayerPool::new(1);
    acquire_or_add(&mut pool, &key("a"));
    assert!(pool.acquire_free(&key("b")).is_none());
    assert!(pool.contains(&key("a")));
}

#[test]
fn acquire_oldest_takes_unbound_handle_too() {
    let mut pool = PlayerPool::new(2);
    pool.add(PlayerHandle::new(MockPlayer::new())).unwrap();
    pool.add_player(&key("a"), MockPlayer::new()).unwrap();

    let handle = pool.acquire_oldest(&key("b")).unwrap();
    assert_eq!(handle.key(), Some(&key("b")));
    assert!(pool.contains(&key("a")));
    assert_eq!(pool.stats().bound, 2);
}

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

#[test]
fn release_shrinks_pool_and_destroys_once() {
    let mut pool = PlayerPool::new(2);
    let a = acquire_or_add(&mut pool, &key("a"));
    acquire_or_add(&mut pool, &key("b"));
    let delegate = attach(&a);

    assert!(pool.release(&key("a")));
    assert_eq!(Arc::strong_count(&delegate), 1);
    assert!(!pool.contains(&key("a")));
    assert_eq!(pool.count(), 1);
    assert_eq!(a.stop_count(), 1);
    assert_eq!(a.listener_clear_count(), 1);
    assert_eq!(a.release_count(), 1);
    assert!(!a.has_delegate());

    assert!(!pool.release(&key("a")));
    assert_eq!(a.release_count(), 1);
}

#[test]
fn release_frees_room_for_new_player() {
    let mut pool = PlayerPool::new(1);
    let a = acquire_or_add(&mut pool, &key("a"));
    pool.release(&key("a"));

    let b = acquire_or_add(&mut pool, &key("b"));
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(pool.stats().created, 2);
}
