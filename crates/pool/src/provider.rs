//! Player provider — per-configuration pools behind one lock.
//!
//! The provider owns one creator and one pool for every distinct
//! [`PlayerConfig`] it has been asked about. Both are built lazily on first
//! use and dropped together by [`PlayerProvider::release_config`].
//!
//! A single mutex covers the configuration map and every pool in it, so
//! "is there a pool yet" and "bind this key" are decided atomically with
//! respect to each other. Nothing under the lock blocks on I/O.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::config::{PlayerConfig, ProviderConfig};
use crate::error::{Error, Result};
use crate::events::{EventBus, PoolEvent};
use crate::key::PlayerKey;
use crate::playback::PlaybackInfoCache;
use crate::player::{CreatorFactory, PlayerCreator, RequestSource};
use crate::pool::{PlayerPool, PoolStats};

type CreatorOf<F> = <F as CreatorFactory>::Creator;
type PlayerOf<F> = <CreatorOf<F> as PlayerCreator>::Player;
type SourceOf<F> = <CreatorOf<F> as PlayerCreator>::Source;

/// Creator and pool owned for one configuration.
struct PoolSlot<C: PlayerCreator> {
    creator: Arc<C>,
    pool: PlayerPool<C::Player>,
}

/// Entry point for consumers: hands out pooled players by
/// `(configuration, key)`.
///
/// Construct one per application and share it by reference or `Arc`.
/// Dropping the provider releases every player it still holds.
pub struct PlayerProvider<F: CreatorFactory> {
    factory: F,
    config: ProviderConfig,
    pools: Mutex<HashMap<PlayerConfig, PoolSlot<CreatorOf<F>>>>,
    events: EventBus,
    playback: PlaybackInfoCache,
}

impl<F: CreatorFactory> PlayerProvider<F> {
    /// Create a provider that builds creators with `factory`.
    ///
    /// # Errors
    /// Returns error if `config` is invalid.
    pub fn new(factory: F, config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let playback = PlaybackInfoCache::new(config.playback_cache_capacity)?;
        Ok(Self {
            factory,
            events: EventBus::new(config.event_buffer),
            config,
            pools: Mutex::new(HashMap::new()),
            playback,
        })
    }

    /// Provider settings.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Bookmarks consumers keep while they do not hold a player.
    #[must_use]
    pub fn playback_cache(&self) -> &PlaybackInfoCache {
        &self.playback
    }

    /// Subscribe to lifecycle events from every pool.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.events.subscribe()
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    /// The player bound to `key` under `config`, binding one if needed.
    ///
    /// Tries, in order: the player already bound to `key`; a free player;
    /// a new player from the configuration's creator while the pool has
    /// room; the least recently accessed player once it is full.
    ///
    /// # Errors
    /// `CapacityExhausted` when the pool size is zero, or the creator's
    /// error when a new player cannot be made.
    pub fn get_or_init(&self, config: &PlayerConfig, key: &PlayerKey) -> Result<Arc<PlayerOf<F>>> {
        let mut pools = self.pools.lock();
        let slot = self.slot(&mut pools, config);

        if let Some(player) = slot.pool.get(key).map(|h| Arc::clone(h.player())) {
            return Ok(player);
        }
        if let Some(player) = slot.pool.acquire_free(key).map(|h| Arc::clone(h.player())) {
            return Ok(player);
        }

        let max_size = slot.pool.max_size();
        if slot.pool.is_full() {
            return slot
                .pool
                .acquire_oldest(key)
                .map(|h| Arc::clone(h.player()))
                .ok_or(Error::CapacityExhausted { max_size });
        }

        let player = slot.creator.create_player()?;
        let handle = slot.pool.add_player(key, player)?;
        Ok(Arc::clone(handle.player()))
    }

    /// The player bound to `key` under `config`, if any. Never creates a
    /// pool or a player.
    pub fn get(&self, config: &PlayerConfig, key: &PlayerKey) -> Option<Arc<PlayerOf<F>>> {
        let mut pools = self.pools.lock();
        let slot = pools.get_mut(config)?;
        slot.pool.get(key).map(|h| Arc::clone(h.player()))
    }

    /// Whether a player is bound to `key` under `config`.
    #[must_use]
    pub fn has(&self, config: &PlayerConfig, key: &PlayerKey) -> bool {
        self.pools
            .lock()
            .get(config)
            .is_some_and(|slot| slot.pool.contains(key))
    }

    /// Unbind `key`'s player under `config`, keeping it pooled for reuse.
    pub fn unregister(&self, config: &PlayerConfig, key: &PlayerKey) -> bool {
        let mut pools = self.pools.lock();
        pools
            .get_mut(config)
            .is_some_and(|slot| slot.pool.unregister(key))
    }

    /// Destroy `key`'s player under `config`.
    pub fn release(&self, config: &PlayerConfig, key: &PlayerKey) -> bool {
        let mut pools = self.pools.lock();
        pools
            .get_mut(config)
            .is_some_and(|slot| slot.pool.release(key))
    }

    /// Destroy every player under `config` and forget its creator and
    /// pool, so the next use starts from fresh state.
    pub fn release_config(&self, config: &PlayerConfig) -> bool {
        let slot = self.pools.lock().remove(config);
        match slot {
            Some(slot) => {
                self.tear_down(slot);
                true
            }
            None => false,
        }
    }

    /// Destroy every player under every configuration.
    pub fn release_all(&self) {
        let slots: Vec<_> = self.pools.lock().drain().map(|(_, slot)| slot).collect();
        for slot in slots {
            self.tear_down(slot);
        }
    }

    // -----------------------------------------------------------------------
    // Default configuration
    // -----------------------------------------------------------------------

    /// [`get_or_init`](Self::get_or_init) under [`PlayerConfig::default`].
    ///
    /// # Errors
    /// Same as `get_or_init`.
    pub fn get_or_init_default(&self, key: &PlayerKey) -> Result<Arc<PlayerOf<F>>> {
        self.get_or_init(&PlayerConfig::default(), key)
    }

    pub fn get_default(&self, key: &PlayerKey) -> Option<Arc<PlayerOf<F>>> {
        self.get(&PlayerConfig::default(), key)
    }

    pub fn unregister_default(&self, key: &PlayerKey) -> bool {
        self.unregister(&PlayerConfig::default(), key)
    }

    pub fn release_default(&self, key: &PlayerKey) -> bool {
        self.release(&PlayerConfig::default(), key)
    }

    // -----------------------------------------------------------------------
    // Creators and request sources
    // -----------------------------------------------------------------------

    /// The creator for `config`, building it (and its pool) on first use.
    pub fn creator(&self, config: &PlayerConfig) -> Arc<CreatorOf<F>> {
        let mut pools = self.pools.lock();
        Arc::clone(&self.slot(&mut pools, config).creator)
    }

    /// Build a request source for `locator` with `config`'s creator.
    pub fn create_request_source(
        &self,
        config: &PlayerConfig,
        locator: &str,
        looping: bool,
    ) -> RequestSource<SourceOf<F>> {
        self.create_request_source_with_extension(config, locator, "", looping)
    }

    /// Build a request source for `locator`, forcing the container
    /// `extension`.
    pub fn create_request_source_with_extension(
        &self,
        config: &PlayerConfig,
        locator: &str,
        extension: &str,
        looping: bool,
    ) -> RequestSource<SourceOf<F>> {
        let creator = self.creator(config);
        RequestSource::new(creator.create_request_source(locator, extension), looping)
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Statistics for `config`'s pool, if it exists.
    pub fn pool_stats(&self, config: &PlayerConfig) -> Option<PoolStats> {
        self.pools.lock().get(config).map(|slot| slot.pool.stats())
    }

    /// Number of configurations with a live pool.
    pub fn pool_count(&self) -> usize {
        self.pools.lock().len()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn slot<'a>(
        &self,
        pools: &'a mut HashMap<PlayerConfig, PoolSlot<CreatorOf<F>>>,
        config: &PlayerConfig,
    ) -> &'a mut PoolSlot<CreatorOf<F>> {
        pools.entry(config.clone()).or_insert_with(|| {
            tracing::debug!(pool_size = self.config.pool_size, "Creating pool for new configuration");
            PoolSlot {
                creator: Arc::new(self.factory.create(config)),
                pool: PlayerPool::with_events(self.config.pool_size, self.events.clone()),
            }
        })
    }

    fn tear_down(&self, mut slot: PoolSlot<CreatorOf<F>>) {
        let players = slot.pool.count();
        slot.pool.release_all();

        tracing::debug!(players, "Released pool");
        self.events.emit(PoolEvent::PoolReleased { players });
    }
}

impl<F: CreatorFactory> Drop for PlayerProvider<F> {
    fn drop(&mut self) {
        for (_, mut slot) in self.pools.get_mut().drain() {
            slot.pool.release_all();
        }
    }
}

impl<F: CreatorFactory> std::fmt::Debug for PlayerProvider<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerProvider")
            .field("config", &self.config)
            .field("pool_count", &self.pool_count())
            .finish()
    }
}
