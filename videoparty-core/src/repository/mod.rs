//! Persistence seam for rooms and memberships.
//!
//! Every operation is a single atomic step against the backing store. Callers
//! bound each call with [`crate::resilience::timeout::bounded`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    models::{NewRoom, Room, RoomId, RoomMember},
    Result,
};

pub use memory::MemoryRoomStore;
pub use postgres::PgRoomStore;

#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Insert a room and assign its id.
    ///
    /// Fails with `Error::AlreadyExists` when a live room already holds the code.
    async fn insert_room(&self, room: NewRoom) -> Result<Room>;

    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>>;

    async fn get_room_by_code(&self, code: &str) -> Result<Option<Room>>;

    /// Persist the mutable fields of an existing room and return the stored copy.
    async fn save_room(&self, room: &Room) -> Result<Room>;

    /// Remove a room and its memberships. Returns false if it was already gone.
    async fn delete_room(&self, room_id: &RoomId) -> Result<bool>;

    /// Record a membership. An existing record for the same pair is returned unchanged.
    async fn add_member(&self, member: RoomMember) -> Result<RoomMember>;

    /// Members of a room, oldest join first.
    async fn list_members(&self, room_id: &RoomId) -> Result<Vec<RoomMember>>;
}
