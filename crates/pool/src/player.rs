//! Capabilities the pool needs from the playback engine.
//!
//! The pool never decodes or renders anything itself. It only needs to be
//! able to make a player, detach it from whatever it is showing on, and
//! tear it down. Everything else about the engine stays behind these
//! traits.

use std::sync::Arc;

use crate::config::PlayerConfig;
use crate::error::Result;

/// Callbacks a view-side target installs on a player to track attachment.
pub trait AttachmentDelegate: Send + Sync {
    /// The player was attached to the target.
    fn on_attach(&self);

    /// The player was detached from the target.
    fn on_detach(&self);

    /// Whether the target currently considers the player attached.
    fn is_attached(&self) -> bool;
}

/// A pooled, reusable player.
///
/// Methods take `&self`: players are shared between the pool and the
/// consumer currently bound to them, so implementations keep their own
/// interior state.
pub trait Player: Send + Sync + 'static {
    /// Stop playback without resetting the position.
    fn stop(&self);

    /// Free the engine resources behind this player. The player is not
    /// used again afterwards.
    fn release(&self);

    /// Notify listeners that the player left its target.
    fn post_detached_event(&self) {}

    /// Install or clear the attachment delegate.
    fn set_attachment_delegate(&self, delegate: Option<Arc<dyn AttachmentDelegate>>);

    /// Drop every registered event listener.
    fn remove_all_event_listeners(&self);

    /// Whether the player is attached to any target.
    fn is_attached(&self) -> bool;
}

/// Per-configuration factory for players and request sources.
pub trait PlayerCreator: Send + Sync + 'static {
    /// The player type this creator makes.
    type Player: Player;

    /// The media request source type this creator builds.
    type Source;

    /// Manufacture a brand-new player.
    fn create_player(&self) -> Result<Self::Player>;

    /// Build a request source for `locator`. An empty `extension` lets
    /// the creator infer the container from the locator.
    fn create_request_source(&self, locator: &str, extension: &str) -> Self::Source;
}

/// Builds the creator for a configuration the provider has not seen yet.
pub trait CreatorFactory: Send + Sync {
    /// The creator type produced.
    type Creator: PlayerCreator;

    /// Build a creator for `config`.
    fn create(&self, config: &PlayerConfig) -> Self::Creator;
}

impl<F, C> CreatorFactory for F
where
    F: Fn(&PlayerConfig) -> C + Send + Sync,
    C: PlayerCreator,
{
    type Creator = C;

    fn create(&self, config: &PlayerConfig) -> C {
        self(config)
    }
}

/// A request source, optionally set to loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource<S> {
    /// Play once
    Single(S),
    /// Restart from the beginning on completion
    Looping(S),
}

impl<S> RequestSource<S> {
    /// Wrap `source`, looping when requested.
    pub fn new(source: S, looping: bool) -> Self {
        if looping {
            Self::Looping(source)
        } else {
            Self::Single(source)
        }
    }

    /// Whether the source loops.
    #[must_use]
    pub fn is_looping(&self) -> bool {
        matches!(self, Self::Looping(_))
    }

    /// Borrow the wrapped source.
    #[must_use]
    pub fn source(&self) -> &S {
        match self {
            Self::Single(s) | Self::Looping(s) => s,
        }
    }

    /// Take the wrapped source.
    pub fn into_inner(self) -> S {
        match self {
            Self::Single(s) | Self::Looping(s) => s,
        }
    }
}
