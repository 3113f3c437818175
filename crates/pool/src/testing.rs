//! Testing utilities for player pooling
//!
//! [`MockPlayer`] counts the lifecycle calls the pool makes on it and lets
//! a test flip its attachment state. [`MockDelegate`] stands in for the
//! target a player is attached to. [`MockCreator`] hands out mock players
//! and can be told to fail.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::config::PlayerConfig;
use crate::error::{Error, Result};
use crate::player::{AttachmentDelegate, Player, PlayerCreator};

/// Player double that records what the pool did to it.
#[derive(Default)]
pub struct MockPlayer {
    attached: AtomicBool,
    stops: AtomicUsize,
    releases: AtomicUsize,
    listener_clears: AtomicUsize,
    detached_events: AtomicUsize,
    delegate: Mutex<Option<Arc<dyn AttachmentDelegate>>>,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the player as attached to (or detached from) a target.
    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::SeqCst);
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn listener_clear_count(&self) -> usize {
        self.listener_clears.load(Ordering::SeqCst)
    }

    pub fn detached_event_count(&self) -> usize {
        self.detached_events.load(Ordering::SeqCst)
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.lock().is_some()
    }
}

impl Player for MockPlayer {
    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn post_detached_event(&self) {
        self.detached_events.fetch_add(1, Ordering::SeqCst);
    }

    fn set_attachment_delegate(&self, delegate: Option<Arc<dyn AttachmentDelegate>>) {
        *self.delegate.lock() = delegate;
    }

    fn remove_all_event_listeners(&self) {
        self.listener_clears.fetch_add(1, Ordering::SeqCst);
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MockPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPlayer")
            .field("attached", &self.is_attached())
            .field("stops", &self.stop_count())
            .field("releases", &self.release_count())
            .finish()
    }
}

/// Attachment delegate double for a single target.
#[derive(Debug, Default)]
pub struct MockDelegate {
    attached: AtomicBool,
}

impl MockDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl AttachmentDelegate for MockDelegate {
    fn on_attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
    }

    fn on_detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

/// Request source produced by [`MockCreator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSource {
    pub locator: String,
    pub extension: String,
}

/// Creator double that counts the players it makes.
#[derive(Debug, Default)]
pub struct MockCreator {
    config: PlayerConfig,
    created: AtomicUsize,
    fail: AtomicBool,
}

impl MockCreator {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            config: config.clone(),
            ..Self::default()
        }
    }

    /// The configuration this creator was built for.
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Make subsequent `create_player` calls fail.
    pub fn fail_creation(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl PlayerCreator for MockCreator {
    type Player = MockPlayer;
    type Source = MockSource;

    fn create_player(&self) -> Result<MockPlayer> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::creation("mock creator set to fail"));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(MockPlayer::new())
    }

    fn create_request_source(&self, locator: &str, extension: &str) -> MockSource {
        MockSource {
            locator: locator.to_string(),
            extension: extension.to_string(),
        }
    }
}
