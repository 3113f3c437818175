//! Configuration types
//!
//! [`PlayerConfig`] is the value that routes a request to a pool: two
//! configurations that compare equal share one pool and one creator.
//! [`ProviderConfig`] sizes the provider itself.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether decoder extensions are used alongside the built-in renderers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExtensionMode {
    /// Only built-in renderers
    #[default]
    Off,
    /// Extension renderers after the built-in ones
    On,
    /// Extension renderers before the built-in ones
    Prefer,
}

/// Buffering thresholds handed to the playback engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadControl {
    /// Minimum media duration the engine tries to keep buffered
    pub min_buffer_ms: u32,
    /// Maximum media duration the engine buffers ahead
    pub max_buffer_ms: u32,
    /// Buffered duration required to start playback
    pub buffer_for_playback_ms: u32,
    /// Buffered duration required to resume after a rebuffer
    pub buffer_for_rebuffer_ms: u32,
}

impl Default for LoadControl {
    fn default() -> Self {
        Self {
            min_buffer_ms: 50_000,
            max_buffer_ms: 50_000,
            buffer_for_playback_ms: 2_500,
            buffer_for_rebuffer_ms: 5_000,
        }
    }
}

/// Bandwidth estimation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BandwidthMeter {
    /// Estimate used before any transfer has been measured
    pub initial_estimate_bps: u64,
}

impl Default for BandwidthMeter {
    fn default() -> Self {
        Self {
            initial_estimate_bps: 1_000_000,
        }
    }
}

/// On-disk media cache the creator should route reads through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CacheSettings {
    /// Cache directory
    pub directory: PathBuf,
    /// Upper bound on cached bytes
    pub max_bytes: u64,
}

/// DRM scheme a creator must be able to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DrmScheme {
    /// Google Widevine
    Widevine,
    /// Microsoft PlayReady
    PlayReady,
    /// W3C Clear Key
    ClearKey,
}

/// Immutable configuration that selects a pool.
///
/// Equality and hashing are structural over every field, so two
/// independently built values with the same settings resolve to the
/// same pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerConfig {
    /// Renderer extension mode
    pub extension_mode: ExtensionMode,
    /// Buffering thresholds
    pub load_control: LoadControl,
    /// Bandwidth estimation
    pub bandwidth: BandwidthMeter,
    /// Optional media cache
    pub cache: Option<CacheSettings>,
    /// Optional user agent for network data sources
    pub user_agent: Option<String>,
    /// DRM schemes, in preference order
    pub drm_schemes: Vec<DrmScheme>,
}

impl PlayerConfig {
    /// Whether a media cache is configured.
    #[must_use]
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Whether a custom user agent is configured.
    #[must_use]
    pub fn has_user_agent(&self) -> bool {
        self.user_agent.is_some()
    }

    /// Whether any DRM scheme is configured.
    #[must_use]
    pub fn has_drm_schemes(&self) -> bool {
        !self.drm_schemes.is_empty()
    }
}

/// Settings for a [`PlayerProvider`](crate::provider::PlayerProvider).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProviderConfig {
    /// Capacity of each per-configuration pool. Zero is allowed and
    /// produces pools that never create a player.
    pub pool_size: usize,
    /// Capacity of the lifecycle event channel
    pub event_buffer: usize,
    /// Number of playback bookmarks retained
    pub playback_cache_capacity: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            pool_size: 5,
            event_buffer: 256,
            playback_cache_capacity: 512,
        }
    }
}

impl ProviderConfig {
    /// Validate provider settings, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer == 0 {
            return Err(Error::configuration(
                "event_buffer must be greater than 0",
            ));
        }
        if self.playback_cache_capacity == 0 {
            return Err(Error::configuration(
                "playback_cache_capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}
