//! Room session façade
//!
//! Every authenticated operation resolves the caller through the
//! [`IdentityProvider`] first; unauthenticated calls never reach the store.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    config::RoomConfig,
    models::{CreateRoomRequest, PlaybackEvent, PlaybackUpdate, Room, RoomMember},
    repository::RoomStore,
    service::{
        auth::IdentityProvider, events::RoomEventHub, member::MembershipTracker,
        playback::PlaybackCoordinator, registry::RoomRegistry,
    },
    Result,
};

#[derive(Clone)]
pub struct RoomSessionService {
    identity: Arc<dyn IdentityProvider>,
    registry: RoomRegistry,
    members: MembershipTracker,
    playback: PlaybackCoordinator,
    events: Arc<RoomEventHub>,
}

impl std::fmt::Debug for RoomSessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSessionService").finish()
    }
}

impl RoomSessionService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn RoomStore>,
        config: &RoomConfig,
    ) -> Self {
        let registry = RoomRegistry::new(store.clone(), config);
        let members = MembershipTracker::new(store, registry.timeout());
        let events = Arc::new(RoomEventHub::new(config.event_buffer));

        let mut playback = PlaybackCoordinator::new(registry.clone());
        playback.set_broadcaster(events.clone());

        Self {
            identity,
            registry,
            members,
            playback,
            events,
        }
    }

    /// Create a room hosted by the caller. The host is its first member.
    pub async fn create_room(&self, token: &str, request: CreateRoomRequest) -> Result<Room> {
        let host_id = self.identity.authenticate(token)?;
        let (name, video_ref) = request.normalize()?;

        let room = self.registry.create(host_id.clone(), name, video_ref).await?;

        if let Err(e) = self.members.join(&room.id, &host_id).await {
            // Don't leave a room behind whose host is not a member.
            warn!(room_id = %room.id, error = %e, "Failed to add host as member, removing room");
            if let Err(cleanup) = self.registry.delete(&room.id).await {
                warn!(room_id = %room.id, error = %cleanup, "Failed to remove half-created room");
            }
            return Err(e);
        }

        Ok(room)
    }

    pub async fn get_room(&self, code: &str) -> Result<Room> {
        self.registry.get_by_code(code).await
    }

    /// Join the room with `code`. Joining again is a no-op.
    pub async fn join_room(&self, token: &str, code: &str) -> Result<Room> {
        let user_id = self.identity.authenticate(token)?;
        let room = self.registry.get_by_code(code).await?;
        self.members.join(&room.id, &user_id).await?;
        Ok(room)
    }

    /// Change playback state. Only the host may do this.
    pub async fn update_state(
        &self,
        token: &str,
        code: &str,
        is_playing: bool,
        position_seconds: f64,
    ) -> Result<Room> {
        let user_id = self.identity.authenticate(token)?;
        let room = self.registry.get_by_code(code).await?;
        self.playback
            .apply_update(&room.id, &user_id, PlaybackUpdate::new(is_playing, position_seconds))
            .await
    }

    pub async fn list_members(&self, code: &str) -> Result<Vec<RoomMember>> {
        let room = self.registry.get_by_code(code).await?;
        self.members.list_members(&room.id).await
    }

    /// Delete a room. Only the host may do this; the code becomes free again.
    pub async fn delete_room(&self, token: &str, code: &str) -> Result<()> {
        let user_id = self.identity.authenticate(token)?;
        let room = self.registry.get_by_code(code).await?;
        self.playback.close_room(&room.id, &user_id).await?;
        self.events.close(&room.id);
        info!(room_id = %room.id, code = %room.code, host_id = %user_id, "Room closed by host");
        Ok(())
    }

    /// Live feed of committed playback changes for the room with `code`.
    pub async fn subscribe(&self, code: &str) -> Result<broadcast::Receiver<PlaybackEvent>> {
        let room = self.registry.get_by_code(code).await?;
        Ok(self.events.subscribe(&room.id))
    }
}
