//! Playback bookmarks.
//!
//! When a consumer loses its player (unregistered, or taken over by a newer
//! key) it stores where it was here, and restores from here when it gets a
//! player again. The cache is bounded and forgets the least recently used
//! bookmark first.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::key::PlayerKey;

/// Volume state of a player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeInfo {
    muted: bool,
    volume: f32,
}

impl VolumeInfo {
    /// Create a volume state. `volume` is clamped to `[0.0, 1.0]`.
    #[must_use]
    pub fn new(muted: bool, volume: f32) -> Self {
        Self {
            muted,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Whether output is muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Output volume in `[0.0, 1.0]`.
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl Default for VolumeInfo {
    fn default() -> Self {
        Self::new(false, 1.0)
    }
}

/// Where a consumer's playback stood when it last let go of a player.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackInfo {
    /// Position in milliseconds
    pub position_ms: u64,
    /// Media duration in milliseconds, zero when unknown
    pub duration_ms: u64,
    /// Volume at the time of the bookmark
    pub volume: VolumeInfo,
    /// Whether playback had reached the end
    pub ended: bool,
}

/// Bounded, thread-safe LRU of playback bookmarks keyed by consumer.
pub struct PlaybackInfoCache {
    entries: Mutex<LruCache<PlayerKey, PlaybackInfo>>,
}

impl PlaybackInfoCache {
    /// Create a cache holding at most `capacity` bookmarks.
    ///
    /// # Errors
    /// `Configuration` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            Error::configuration("playback cache capacity must be greater than 0")
        })?;
        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Store a bookmark, returning the one it replaced.
    pub fn put(&self, key: PlayerKey, info: PlaybackInfo) -> Option<PlaybackInfo> {
        self.entries.lock().put(key, info)
    }

    /// Look up a bookmark, marking it recently used.
    pub fn get(&self, key: &PlayerKey) -> Option<PlaybackInfo> {
        self.entries.lock().get(key).copied()
    }

    /// Remove a bookmark.
    pub fn remove(&self, key: &PlayerKey) -> Option<PlaybackInfo> {
        self.entries.lock().pop(key)
    }

    /// Whether a bookmark exists, without affecting recency.
    pub fn contains(&self, key: &PlayerKey) -> bool {
        self.entries.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl std::fmt::Debug for PlaybackInfoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("PlaybackInfoCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}
