//! # Reel Player Pooling
//!
//! Shares a small number of expensive media players among many short-lived
//! consumers (rows scrolling through a feed) without ever exceeding a fixed
//! budget per configuration.
//!
//! - [`PlayerPool`] is the bounded, keyed pool: acquire by key, reuse free
//!   players first, take over the least recently accessed player when full.
//! - [`PlayerProvider`] maps each distinct [`PlayerConfig`] to its own
//!   creator and pool, and is what consumers talk to.
//! - The playback engine stays behind the [`Player`] and [`PlayerCreator`]
//!   traits.

pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod key;
pub mod playback;
pub mod player;
pub mod pool;
pub mod provider;
pub mod testing;

pub use config::{PlayerConfig, ProviderConfig};
pub use error::{Error, Result};
pub use events::{EventBus, PoolEvent};
pub use handle::{AccessStamp, HandleId, PlayerHandle};
pub use key::PlayerKey;
pub use playback::{PlaybackInfo, PlaybackInfoCache, VolumeInfo};
pub use player::{AttachmentDelegate, CreatorFactory, Player, PlayerCreator, RequestSource};
pub use pool::{PlayerPool, PoolStats};
pub use provider::PlayerProvider;
