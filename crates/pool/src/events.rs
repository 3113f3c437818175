//! Event broadcasting for player lifecycle observability.
//!
//! Provides [`PoolEvent`] variants emitted as pools bind, take over and
//! destroy players, and an [`EventBus`] backed by `tokio::sync::broadcast`.

use tokio::sync::broadcast;

use crate::handle::HandleId;
use crate::key::PlayerKey;

// ---------------------------------------------------------------------------
// PoolEvent
// ---------------------------------------------------------------------------

/// Events emitted by pools and the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    /// A new player entered a pool.
    Created {
        /// The new handle.
        handle: HandleId,
        /// The key it was bound to on entry, if any.
        key: Option<PlayerKey>,
    },
    /// A free player was bound to a new key.
    Reused {
        /// The reused handle.
        handle: HandleId,
        /// The key it is now bound to.
        key: PlayerKey,
    },
    /// The least recently accessed player was taken over by a new key.
    Evicted {
        /// The taken-over handle.
        handle: HandleId,
        /// The key it is now bound to.
        key: PlayerKey,
        /// The key that lost the player, if it was bound.
        evicted: Option<PlayerKey>,
    },
    /// A key gave up its player; the player stays pooled.
    Unregistered {
        /// The now unbound handle.
        handle: HandleId,
        /// The key that was unbound.
        key: PlayerKey,
    },
    /// A player was destroyed and its handle dropped.
    Released {
        /// The dropped handle.
        handle: HandleId,
        /// The key it was bound to, if any.
        key: Option<PlayerKey>,
    },
    /// A whole per-configuration pool was torn down.
    PoolReleased {
        /// Number of players destroyed with it.
        players: usize,
    },
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Broadcast-based event bus for pool lifecycle events.
///
/// Emission is fire-and-forget: if no subscribers are listening or the
/// channel is full, events are dropped without blocking the emitter.
/// Cloning the bus yields another sender on the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PoolEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer size.
    ///
    /// # Panics
    /// Panics if `buffer_size` is zero.
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self { sender }
    }

    /// Emit an event to all current subscribers.
    pub fn emit(&self, event: PoolEvent) {
        // An error only means nobody is listening.
        let _ = self.sender.send(event);
    }

    /// Subscribe to events emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.sender.receiver_count())
            .finish()
    }
}
