//! Membership tracking
//!
//! Membership only grows: there is no leave operation. A room's members go
//! away together with the room.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::{
    models::{RoomId, RoomMember, UserId},
    repository::RoomStore,
    resilience::timeout::bounded,
    Result,
};

#[derive(Clone)]
pub struct MembershipTracker {
    store: Arc<dyn RoomStore>,
    timeout: Duration,
}

impl std::fmt::Debug for MembershipTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipTracker").finish()
    }
}

impl MembershipTracker {
    pub fn new(store: Arc<dyn RoomStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Record that `user_id` joined. Joining twice returns the first record.
    pub async fn join(&self, room_id: &RoomId, user_id: &UserId) -> Result<RoomMember> {
        let candidate = RoomMember::new(room_id.clone(), user_id.clone());
        let joined_at = candidate.joined_at;

        let member = bounded(self.timeout, "add member", self.store.add_member(candidate)).await?;
        if member.joined_at == joined_at {
            info!(room_id = %room_id, user_id = %user_id, "User joined room");
        }
        Ok(member)
    }

    /// Members ordered by join time, oldest first.
    pub async fn list_members(&self, room_id: &RoomId) -> Result<Vec<RoomMember>> {
        bounded(self.timeout, "list members", self.store.list_members(room_id)).await
    }
}
