//! Fan-out of accepted-placement events to live board viewers.
//!
//! The hub is an explicit, injectable instance -- constructed once at
//! startup and handed to the engine (publish side) and the transport
//! layer (subscribe side); there is no global subscriber state. Each
//! board gets its own [`tokio::sync::broadcast`] channel, created lazily
//! on first subscribe and pruned once the last receiver is gone, so
//! events for one board never wake viewers of another.
//!
//! Delivery is best-effort and at-most-once. Publishing never blocks:
//! each subscriber owns a bounded queue, and one that falls behind by
//! more than the channel capacity observes
//! [`tokio::sync::broadcast::error::RecvError::Lagged`], upon which the
//! transport layer disconnects it so the client resynchronizes with a
//! full board fetch. Within one board, events arrive in publish order.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tessera_types::{BoardId, BoardMessage};
use tokio::sync::broadcast;

/// Default per-subscriber queue capacity.
///
/// A subscriber that falls behind by more than this many messages is
/// considered lagged and gets disconnected by the transport layer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Best-effort, per-board fan-out of [`BoardMessage`]s.
pub struct BroadcastHub {
    channels: Mutex<HashMap<BoardId, broadcast::Sender<BoardMessage>>>,
    capacity: usize,
}

impl BroadcastHub {
    /// Create a hub with the default per-subscriber queue capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a hub with an explicit per-subscriber queue capacity
    /// (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to a board's live placement stream.
    ///
    /// The returned receiver yields every message published for that
    /// board from this point on, in publish order, until it lags or the
    /// hub is dropped.
    pub fn subscribe(&self, board_id: BoardId) -> broadcast::Receiver<BoardMessage> {
        let mut channels = self.lock_channels();
        channels
            .entry(board_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish a message to every current subscriber of its board.
    ///
    /// Returns the number of receivers the message reached; 0 means no
    /// one is watching, which is normal and not an error. Never blocks
    /// and never fails.
    pub fn publish(&self, message: &BoardMessage) -> usize {
        let board_id = message.board_id();
        let mut channels = self.lock_channels();
        let Some(sender) = channels.get(&board_id) else {
            return 0;
        };
        match sender.send(message.clone()) {
            Ok(receivers) => receivers,
            Err(_) => {
                // The last receiver is gone; drop the channel so an idle
                // board costs nothing.
                channels.remove(&board_id);
                0
            }
        }
    }

    /// Number of boards that currently have a live channel.
    pub fn board_channels(&self) -> usize {
        self.lock_channels().len()
    }

    fn lock_channels(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<BoardId, broadcast::Sender<BoardMessage>>> {
        // A poisoned lock only means another thread panicked mid-access;
        // the map itself is still coherent for this usage.
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
