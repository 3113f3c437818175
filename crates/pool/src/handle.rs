//! Pool bookkeeping around a single player.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::key::PlayerKey;
use crate::player::Player;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    fn next() -> Self {
        Self(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle-{}", self.0)
    }
}

/// Monotonic access timestamp issued by a pool's clock.
///
/// Later stamps always compare greater, so ordering by stamp is ordering
/// by recency of access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessStamp(u64);

impl AccessStamp {
    /// Stamp carried by a handle that no pool has touched yet.
    pub const ZERO: Self = Self(0);

    /// Raw tick value.
    #[must_use]
    pub fn ticks(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A pooled player plus its binding and recency.
///
/// The handle is the sole owner of record for its player; consumers get
/// shared clones of the `Arc` but the pool decides when the player is
/// released. A handle always holds a player: destroying the player
/// consumes the handle.
pub struct PlayerHandle<P> {
    id: HandleId,
    last_access: AccessStamp,
    key: Option<PlayerKey>,
    player: Arc<P>,
}

impl<P> PlayerHandle<P> {
    /// Wrap a freshly created player in an unbound handle.
    pub fn new(player: P) -> Self {
        Self::from_shared(Arc::new(player))
    }

    /// Wrap an already shared player in an unbound handle.
    pub fn from_shared(player: Arc<P>) -> Self {
        Self {
            id: HandleId::next(),
            last_access: AccessStamp::ZERO,
            key: None,
            player,
        }
    }

    /// Handle identity.
    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Last access stamp.
    #[must_use]
    pub fn last_access(&self) -> AccessStamp {
        self.last_access
    }

    /// Key of the bound consumer, if any.
    #[must_use]
    pub fn key(&self) -> Option<&PlayerKey> {
        self.key.as_ref()
    }

    /// Whether a consumer is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.key.is_some()
    }

    /// The pooled player.
    #[must_use]
    pub fn player(&self) -> &Arc<P> {
        &self.player
    }

    /// Record an access at `now`. The player is not touched.
    pub fn touch(&mut self, now: AccessStamp) {
        self.last_access = now;
    }

    /// Bind to `key`. Uniqueness of the key is the pool's concern.
    pub fn bind(&mut self, key: PlayerKey) {
        self.key = Some(key);
    }

    /// Builder form of [`bind`](Self::bind).
    #[must_use]
    pub fn with_key(mut self, key: PlayerKey) -> Self {
        self.bind(key);
        self
    }

    /// Clear the binding, returning the previous key. The player is not
    /// touched.
    pub fn unbind(&mut self) -> Option<PlayerKey> {
        self.key.take()
    }

    pub(crate) fn into_player(self) -> Arc<P> {
        self.player
    }
}

impl<P: Player> PlayerHandle<P> {
    /// Unbound and not attached to any target.
    #[must_use]
    pub fn is_free(&self) -> bool {
        !self.is_bound() && !self.player.is_attached()
    }
}

impl<P> fmt::Debug for PlayerHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("id", &self.id)
            .field("last_access", &self.last_access)
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlayer;

    fn key(s: &str) -> PlayerKey {
        PlayerKey::new(s).unwrap()
    }

    #[test]
    fn new_handle_is_unbound() {
        let handle = PlayerHandle::new(MockPlayer::new());
        assert!(!handle.is_bound());
        assert_eq!(handle.last_access(), AccessStamp::ZERO);
        assert!(handle.is_free());
    }

    #[test]
    fn ids_are_unique() {
        let a = PlayerHandle::new(MockPlayer::new());
        let b = PlayerHandle::new(MockPlayer::new());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn bind_and_unbind_leave_player_alone() {
        let mut handle = PlayerHandle::new(MockPlayer::new()).with_key(key("a"));
        assert_eq!(handle.key(), Some(&key("a")));
        assert!(!handle.is_free());

        assert_eq!(handle.unbind(), Some(key("a")));
        assert!(handle.unbind().is_none());
        assert_eq!(handle.player().stop_count(), 0);
    }

    #[test]
    fn attached_player_is_not_free() {
        let handle = PlayerHandle::new(MockPlayer::new());
        handle.player().set_attached(true);
        assert!(!handle.is_free());
    }

    #[test]
    fn touch_updates_stamp() {
        let mut handle = PlayerHandle::new(MockPlayer::new());
        let later = AccessStamp::ZERO.next().next();
        handle.touch(later);
        assert_eq!(handle.last_access(), later);
        assert_eq!(handle.last_access().ticks(), 2);
    }
}
