//! Bounded, keyed pool of player handles.
//!
//! A [`PlayerPool`] holds at most `max_size` handles. Each handle is either
//! bound to one consumer key or unbound. Acquiring a key reuses a free
//! handle when one exists and otherwise takes over the least recently
//! accessed handle, bound or not. Players are created by the caller and
//! handed in through [`PlayerPool::add`]; the pool never manufactures one
//! itself.
//!
//! The pool is `Send` but takes `&mut self` for everything that touches
//! recency. Shared use goes through a lock; the provider keeps every pool
//! under its own mutex.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::events::{EventBus, PoolEvent};
use crate::handle::{AccessStamp, HandleId, PlayerHandle};
use crate::key::PlayerKey;
use crate::player::Player;

/// Pool statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Capacity the pool was built with.
    pub max_size: usize,
    /// Handles currently held, bound or not.
    pub total: usize,
    /// Handles currently bound to a key.
    pub bound: usize,
    /// Handles ever added.
    pub created: u64,
    /// Acquisitions served by a free handle.
    pub reused: u64,
    /// Acquisitions served by taking over the oldest handle.
    pub evicted: u64,
    /// Handles whose player was destroyed.
    pub released: u64,
}

/// Bounded pool of keyed, reusable players.
pub struct PlayerPool<P: Player> {
    max_size: usize,
    /// Ordered by id so scans visit handles in creation order.
    handles: BTreeMap<HandleId, PlayerHandle<P>>,
    /// Bound handles only.
    index: HashMap<PlayerKey, HandleId>,
    clock: AccessStamp,
    stats: PoolStats,
    events: Option<EventBus>,
}

impl<P: Player> std::fmt::Debug for PlayerPool<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerPool")
            .field("max_size", &self.max_size)
            .field("total", &self.handles.len())
            .field("bound", &self.index.len())
            .finish()
    }
}

impl<P: Player> PlayerPool<P> {
    /// Create an empty pool holding at most `max_size` handles.
    ///
    /// A pool of size zero never holds a handle, so every acquisition on
    /// it comes back empty.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            handles: BTreeMap::new(),
            index: HashMap::new(),
            clock: AccessStamp::ZERO,
            stats: PoolStats {
                max_size,
                ..PoolStats::default()
            },
            events: None,
        }
    }

    /// Create a pool that reports lifecycle changes on `events`.
    #[must_use]
    pub fn with_events(max_size: usize, events: EventBus) -> Self {
        Self {
            events: Some(events),
            ..Self::new(max_size)
        }
    }

    /// Capacity of the pool.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of handles held, bound or not.
    #[must_use]
    pub fn count(&self) -> usize {
        self.handles.len()
    }

    /// Whether the pool holds no handles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Whether the pool holds exactly `max_size` handles.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.handles.len() == self.max_size
    }

    /// Whether a handle is bound to `key`.
    #[must_use]
    pub fn contains(&self, key: &PlayerKey) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate over every handle in creation order.
    pub fn handles(&self) -> impl Iterator<Item = &PlayerHandle<P>> {
        self.handles.values()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total: self.handles.len(),
            bound: self.index.len(),
            ..self.stats.clone()
        }
    }

    // -----------------------------------------------------------------------
    // Insertion and removal
    // -----------------------------------------------------------------------

    /// Insert a handle, indexing it under its key if it carries one.
    ///
    /// # Errors
    /// `CapacityExhausted` if the pool is full, `InvalidArgument` if the
    /// handle's key is already bound to another handle.
    pub fn add(&mut self, mut handle: PlayerHandle<P>) -> Result<&PlayerHandle<P>> {
        if self.handles.len() >= self.max_size {
            return Err(Error::CapacityExhausted {
                max_size: self.max_size,
            });
        }
        if let Some(key) = handle.key()
            && self.index.contains_key(key)
        {
            return Err(Error::invalid_argument(format!(
                "key '{key}' is already bound"
            )));
        }

        let id = handle.id();
        handle.touch(self.tick());
        if let Some(key) = handle.key() {
            self.index.insert(key.clone(), id);
        }
        self.stats.created += 1;

        tracing::debug!(handle = %id, key = ?handle.key().map(PlayerKey::as_str), "Added player");
        self.emit(PoolEvent::Created {
            handle: id,
            key: handle.key().cloned(),
        });

        let handle: &PlayerHandle<P> = self.handles.entry(id).or_insert(handle);
        Ok(handle)
    }

    /// Wrap `player` in a new handle bound to `key` and insert it.
    pub fn add_player(&mut self, key: &PlayerKey, player: P) -> Result<&PlayerHandle<P>> {
        self.add(PlayerHandle::new(player).with_key(key.clone()))
    }

    /// Remove the handle bound to `key` from the pool without touching its
    /// player. The returned handle is unbound.
    pub fn remove(&mut self, key: &PlayerKey) -> Option<PlayerHandle<P>> {
        let id = self.index.remove(key)?;
        let mut handle = self.handles.remove(&id)?;
        handle.unbind();
        Some(handle)
    }

    /// Remove a handle by identity, whether bound or not, without touching
    /// its player. The returned handle is unbound.
    pub fn remove_handle(&mut self, id: HandleId) -> Option<PlayerHandle<P>> {
        let mut handle = self.handles.remove(&id)?;
        if let Some(key) = handle.unbind() {
            self.index.remove(&key);
        }
        Some(handle)
    }

    /// Detach the player bound to `key` and drop the binding.
    ///
    /// The handle stays in the pool as an unbound, reusable instance.
    /// Returns `false` when nothing was bound to `key`; calling this twice
    /// is harmless.
    pub fn unregister(&mut self, key: &PlayerKey) -> bool {
        let Some(id) = self.index.remove(key) else {
            return false;
        };
        if let Some(handle) = self.handles.get_mut(&id) {
            detach(handle.player());
            handle.unbind();
        }

        tracing::debug!(key = %key, handle = %id, "Unregistered player");
        self.emit(PoolEvent::Unregistered {
            handle: id,
            key: key.clone(),
        });
        true
    }

    // -----------------------------------------------------------------------
    // Acquisition
    // -----------------------------------------------------------------------

    /// Bind a handle to `key`, reusing a free handle if there is one and
    /// taking over the oldest handle otherwise.
    ///
    /// If `key` is already bound, its handle is returned as is. `None`
    /// means the pool holds no handle at all.
    pub fn acquire(&mut self, key: &PlayerKey) -> Option<&PlayerHandle<P>> {
        if self.index.contains_key(key) {
            return self.get(key);
        }
        if let Some(id) = self.free_id() {
            return self.rebind_free(id, key);
        }
        self.acquire_oldest(key)
    }

    /// Bind a free handle to `key`. Never evicts.
    ///
    /// If `key` is already bound, its handle is returned as is.
    pub fn acquire_free(&mut self, key: &PlayerKey) -> Option<&PlayerHandle<P>> {
        if self.index.contains_key(key) {
            return self.get(key);
        }
        let id = self.free_id()?;
        self.rebind_free(id, key)
    }

    /// Take over the least recently accessed handle and bind it to `key`.
    ///
    /// The handle's player is detached and its previous binding, if any,
    /// is dropped first. If `key` is already bound, its handle is returned
    /// as is.
    pub fn acquire_oldest(&mut self, key: &PlayerKey) -> Option<&PlayerHandle<P>> {
        if self.index.contains_key(key) {
            return self.get(key);
        }
        let id = self.oldest_id()?;
        let now = self.tick();
        let handle = self.handles.get_mut(&id)?;

        detach(handle.player());
        let evicted = handle.unbind();
        if let Some(previous) = &evicted {
            self.index.remove(previous);
        }
        handle.touch(now);
        handle.bind(key.clone());
        self.index.insert(key.clone(), id);
        self.stats.evicted += 1;

        tracing::debug!(
            key = %key,
            handle = %id,
            evicted = ?evicted.as_ref().map(PlayerKey::as_str),
            "Took over oldest player"
        );
        self.emit(PoolEvent::Evicted {
            handle: id,
            key: key.clone(),
            evicted,
        });

        self.handles.get(&id)
    }

    // -----------------------------------------------------------------------
    // Release
    // -----------------------------------------------------------------------

    /// Detach and destroy the player bound to `key`, removing its handle.
    ///
    /// Returns `false` when nothing was bound to `key`.
    pub fn release(&mut self, key: &PlayerKey) -> bool {
        match self.index.get(key).copied() {
            Some(id) => self.release_handle(id),
            None => false,
        }
    }

    /// Detach and destroy a handle's player by handle identity.
    pub fn release_handle(&mut self, id: HandleId) -> bool {
        let Some(handle) = self.handles.get(&id) else {
            return false;
        };
        detach(handle.player());
        let key = handle.key().cloned();
        if let Some(handle) = self.remove_handle(id) {
            self.destroy(handle, key);
        }
        true
    }

    /// Destroy every player in the pool.
    pub fn release_all(&mut self) {
        let handles = std::mem::take(&mut self.handles);
        self.index.clear();
        for (_, mut handle) in handles {
            detach(handle.player());
            let key = handle.unbind();
            self.destroy(handle, key);
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// The handle bound to `key`, refreshing its access stamp.
    pub fn get(&mut self, key: &PlayerKey) -> Option<&PlayerHandle<P>> {
        let id = *self.index.get(key)?;
        self.touch(id)
    }

    /// The first free handle in creation order, refreshing its access
    /// stamp. The handle stays unbound.
    pub fn get_free(&mut self) -> Option<&PlayerHandle<P>> {
        let id = self.free_id()?;
        self.touch(id)
    }

    /// The least recently accessed handle, refreshing its access stamp.
    pub fn get_oldest(&mut self) -> Option<&PlayerHandle<P>> {
        let id = self.oldest_id()?;
        self.touch(id)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn tick(&mut self) -> AccessStamp {
        self.clock = self.clock.next();
        self.clock
    }

    fn touch(&mut self, id: HandleId) -> Option<&PlayerHandle<P>> {
        let now = self.tick();
        let handle = self.handles.get_mut(&id)?;
        handle.touch(now);
        Some(handle)
    }

    fn free_id(&self) -> Option<HandleId> {
        let handle = self.handles.values().find(|h| h.is_free())?;
        debug_assert!(
            !self.index.values().any(|bound| *bound == handle.id()),
            "unbound handle {} still present in key index",
            handle.id()
        );
        Some(handle.id())
    }

    fn oldest_id(&self) -> Option<HandleId> {
        self.handles
            .values()
            .min_by_key(|h| (h.last_access(), h.id()))
            .map(PlayerHandle::id)
    }

    fn rebind_free(&mut self, id: HandleId, key: &PlayerKey) -> Option<&PlayerHandle<P>> {
        self.index.insert(key.clone(), id);
        self.stats.reused += 1;

        tracing::debug!(key = %key, handle = %id, "Reused free player");
        self.emit(PoolEvent::Reused {
            handle: id,
            key: key.clone(),
        });

        let now = self.tick();
        let handle = self.handles.get_mut(&id)?;
        handle.touch(now);
        handle.bind(key.clone());
        Some(handle)
    }

    fn destroy(&mut self, handle: PlayerHandle<P>, key: Option<PlayerKey>) {
        let id = handle.id();
        handle.into_player().release();
        self.stats.released += 1;

        tracing::debug!(handle = %id, key = ?key.as_ref().map(PlayerKey::as_str), "Released player");
        self.emit(PoolEvent::Released { handle: id, key });
    }

    fn emit(&self, event: PoolEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

/// Sever a player from its target so it can be handed to another key.
fn detach<P: Player>(player: &Arc<P>) {
    player.stop();
    player.post_detached_event();
    player.set_attachment_delegate(None);
    player.remove_all_event_listeners();
}
