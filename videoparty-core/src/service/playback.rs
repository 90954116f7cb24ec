//! Playback state coordination
//!
//! The only path through which a room's playback state changes. Writes to one
//! room are serialized by a per-room async mutex; different rooms never share
//! a lock.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    models::{PlaybackUpdate, Room, RoomId, UserId},
    service::registry::RoomRegistry,
    Error, Result,
};

/// Receives every committed playback change.
///
/// Implementations must not block; delivery is fire-and-forget.
pub trait PlaybackBroadcaster: Send + Sync {
    fn broadcast_playback_state(&self, room: &Room);
}

#[derive(Clone)]
pub struct PlaybackCoordinator {
    registry: RoomRegistry,
    locks: Arc<DashMap<RoomId, Arc<Mutex<()>>>>,
    broadcaster: Option<Arc<dyn PlaybackBroadcaster>>,
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("locked_rooms", &self.locks.len())
            .finish()
    }
}

impl PlaybackCoordinator {
    pub fn new(registry: RoomRegistry) -> Self {
        Self {
            registry,
            locks: Arc::new(DashMap::new()),
            broadcaster: None,
        }
    }

    pub fn set_broadcaster(&mut self, broadcaster: Arc<dyn PlaybackBroadcaster>) {
        self.broadcaster = Some(broadcaster);
    }

    /// Apply a play/pause/seek from `requester`.
    ///
    /// Rejections (`NotFound`, `NotHost`, `InvalidInput`) leave the room
    /// untouched. Once past the host check the commit runs on its own task,
    /// so dropping this future cannot leave a half-applied write.
    pub async fn apply_update(
        &self,
        room_id: &RoomId,
        requester: &UserId,
        update: PlaybackUpdate,
    ) -> Result<Room> {
        if !update.position_seconds.is_finite() {
            return Err(Error::InvalidInput(
                "Playback position must be a finite number".to_string(),
            ));
        }

        let room = self.registry.get(room_id).await?;
        // host_id is fixed at creation, so this check cannot go stale.
        if !room.is_host(requester) {
            warn!(room_id = %room_id, user_id = %requester, "Rejected playback update from non-host");
            return Err(Error::NotHost);
        }

        let coordinator = self.clone();
        let room_id = room.id;
        tokio::spawn(async move { coordinator.commit(&room_id, update).await }).await?
    }

    /// Delete a room on behalf of its host, ordered after in-flight updates.
    pub async fn close_room(&self, room_id: &RoomId, requester: &UserId) -> Result<()> {
        let room = self.registry.get(room_id).await?;
        if !room.is_host(requester) {
            warn!(room_id = %room_id, user_id = %requester, "Rejected room deletion from non-host");
            return Err(Error::NotHost);
        }

        let lock = self.lock_for(room_id);
        let _guard = lock.lock().await;
        self.registry.delete(room_id).await?;
        self.locks.remove(room_id);
        Ok(())
    }

    async fn commit(&self, room_id: &RoomId, update: PlaybackUpdate) -> Result<Room> {
        let lock = self.lock_for(room_id);
        let _guard = lock.lock().await;

        // Reload under the lock so a room deleted while we waited is not resurrected.
        let mut room = self.registry.get(room_id).await?;
        room.playback = room.playback.apply(update, Utc::now());
        let saved = self.registry.save(&room).await?;

        debug!(
            room_id = %room_id,
            is_playing = saved.playback.is_playing,
            position_seconds = saved.playback.position_seconds,
            "Playback state committed"
        );
        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.broadcast_playback_state(&saved);
        }
        Ok(saved)
    }

    fn lock_for(&self, room_id: &RoomId) -> Arc<Mutex<()>> {
        self.locks.entry(room_id.clone()).or_default().clone()
    }
}
