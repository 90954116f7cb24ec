use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};

use super::RoomStore;
use crate::{
    models::{NewRoom, Room, RoomId, RoomMember},
    Error, Result,
};

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryRoomStore {
    rooms: DashMap<RoomId, Room>,
    codes: DashMap<String, RoomId>,
    members: DashMap<RoomId, Vec<RoomMember>>,
}

impl MemoryRoomStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl std::fmt::Debug for MemoryRoomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRoomStore")
            .field("rooms", &self.rooms.len())
            .finish()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn insert_room(&self, new: NewRoom) -> Result<Room> {
        // Claiming the code entry first makes the uniqueness check and the
        // insert one step.
        match self.codes.entry(new.code.clone()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists("Room code already in use".to_string())),
            Entry::Vacant(slot) => {
                let room = Room::from_new(new, RoomId::new(), Utc::now());
                self.rooms.insert(room.id.clone(), room.clone());
                slot.insert(room.id.clone());
                Ok(room)
            }
        }
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>> {
        Ok(self.rooms.get(room_id).map(|r| r.value().clone()))
    }

    async fn get_room_by_code(&self, code: &str) -> Result<Option<Room>> {
        let Some(room_id) = self.codes.get(code).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        self.get_room(&room_id).await
    }

    async fn save_room(&self, room: &Room) -> Result<Room> {
        let mut stored = self
            .rooms
            .get_mut(&room.id)
            .ok_or_else(|| Error::NotFound(format!("Room {} not found", room.id)))?;

        // Identity fields are fixed at creation.
        stored.name.clone_from(&room.name);
        stored.video_ref.clone_from(&room.video_ref);
        stored.playback = room.playback;
        stored.updated_at = Utc::now().max(stored.updated_at);
        Ok(stored.clone())
    }

    async fn delete_room(&self, room_id: &RoomId) -> Result<bool> {
        let Some((_, room)) = self.rooms.remove(room_id) else {
            return Ok(false);
        };
        self.codes.remove_if(&room.code, |_, id| id == room_id);
        self.members.remove(room_id);
        Ok(true)
    }

    async fn add_member(&self, member: RoomMember) -> Result<RoomMember> {
        // Held across the member write so a delete cannot land in between.
        let _room = self
            .rooms
            .get(&member.room_id)
            .ok_or_else(|| Error::NotFound(format!("Room {} not found", member.room_id)))?;

        let mut members = self.members.entry(member.room_id.clone()).or_default();
        if let Some(existing) = members.iter().find(|m| m.user_id == member.user_id) {
            return Ok(existing.clone());
        }
        members.push(member.clone());
        Ok(member)
    }

    async fn list_members(&self, room_id: &RoomId) -> Result<Vec<RoomMember>> {
        let mut members = self
            .members
            .get(room_id)
            .map(|m| m.value().clone())
            .unwrap_or_default();
        // Stable, so equal timestamps keep insertion order.
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }
}
