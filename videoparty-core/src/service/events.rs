//! Per-room fan-out of committed playback changes

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::trace;

use crate::{
    models::{PlaybackEvent, Room, RoomId},
    service::playback::PlaybackBroadcaster,
};

pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// One broadcast channel per room, created on first use.
///
/// Slow receivers lag and skip to the newest events; publishers never block.
pub struct RoomEventHub {
    channels: DashMap<RoomId, broadcast::Sender<PlaybackEvent>>,
    capacity: usize,
}

impl std::fmt::Debug for RoomEventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomEventHub")
            .field("rooms", &self.channels.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Default for RoomEventHub {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

impl RoomEventHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to a room, first sweeping channels whose receivers are all gone.
    pub fn subscribe(&self, room_id: &RoomId) -> broadcast::Receiver<PlaybackEvent> {
        self.prune_idle();
        self.channels
            .entry(room_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Send to current subscribers. Returns how many received it.
    ///
    /// A channel with no receivers left is dropped instead.
    pub fn publish(&self, event: PlaybackEvent) -> usize {
        let Some(sender) = self.channels.get(&event.room_id).map(|s| s.clone()) else {
            return 0;
        };
        if sender.receiver_count() == 0 {
            // Rechecked under the shard lock; a subscribe may have raced us.
            self.channels
                .remove_if(&event.room_id, |_, s| s.receiver_count() == 0);
            return 0;
        }
        // Err only means the last receiver went away meanwhile.
        sender.send(event).unwrap_or(0)
    }

    /// Drop every channel that nobody listens to any more.
    pub fn prune_idle(&self) {
        self.channels.retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Drop the room's channel; open receivers see `Closed` once drained.
    pub fn close(&self, room_id: &RoomId) {
        self.channels.remove(room_id);
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.channels.len()
    }
}

impl PlaybackBroadcaster for RoomEventHub {
    fn broadcast_playback_state(&self, room: &Room) {
        let delivered = self.publish(PlaybackEvent {
            room_id: room.id.clone(),
            code: room.code.clone(),
            playback: room.playback,
        });
        trace!(room_id = %room.id, delivered, "Playback state published");
    }
}
