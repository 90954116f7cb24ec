//! Room registry
//!
//! Owns room creation and lookup. Code uniqueness is enforced by the store's
//! atomic insert; the registry only retries on a reported collision.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    config::RoomConfig,
    models::{NewRoom, Room, RoomId, UserId},
    repository::RoomStore,
    resilience::timeout::bounded,
    service::room_code::RoomCodeGenerator,
    Error, Result,
};

#[derive(Clone)]
pub struct RoomRegistry {
    store: Arc<dyn RoomStore>,
    codes: RoomCodeGenerator,
    max_code_attempts: u32,
    timeout: Duration,
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("codes", &self.codes)
            .field("max_code_attempts", &self.max_code_attempts)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RoomRegistry {
    pub fn new(store: Arc<dyn RoomStore>, config: &RoomConfig) -> Self {
        Self {
            store,
            codes: RoomCodeGenerator::new(config.code_length),
            max_code_attempts: config.max_code_attempts,
            timeout: config.persistence_timeout(),
        }
    }

    /// Deadline applied to each persistence call
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a room with a fresh code, paused at position zero.
    pub async fn create(&self, host_id: UserId, name: String, video_ref: String) -> Result<Room> {
        for attempt in 1..=self.max_code_attempts {
            let new_room = NewRoom {
                code: self.codes.generate(),
                name: name.clone(),
                host_id: host_id.clone(),
                video_ref: video_ref.clone(),
            };
            let code = new_room.code.clone();

            match bounded(self.timeout, "insert room", self.store.insert_room(new_room)).await {
                Ok(room) => {
                    info!(room_id = %room.id, code = %room.code, host_id = %room.host_id, "Room created");
                    return Ok(room);
                }
                Err(Error::AlreadyExists(_)) => {
                    debug!(code = %code, attempt, "Room code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = self.max_code_attempts,
            "Gave up allocating a unique room code"
        );
        Err(Error::CodeExhausted {
            attempts: self.max_code_attempts,
        })
    }

    pub async fn get(&self, room_id: &RoomId) -> Result<Room> {
        bounded(self.timeout, "load room", self.store.get_room(room_id))
            .await?
            .ok_or_else(|| Error::NotFound(format!("Room {room_id} not found")))
    }

    /// Exact, case-sensitive lookup.
    pub async fn get_by_code(&self, code: &str) -> Result<Room> {
        bounded(self.timeout, "load room by code", self.store.get_room_by_code(code))
            .await?
            .ok_or_else(|| Error::NotFound(format!("Room {code} not found")))
    }

    /// Persist a room. Only the playback coordinator calls this for playback changes.
    pub async fn save(&self, room: &Room) -> Result<Room> {
        bounded(self.timeout, "save room", self.store.save_room(room)).await
    }

    /// Remove a room and free its code.
    pub async fn delete(&self, room_id: &RoomId) -> Result<()> {
        let deleted = bounded(self.timeout, "delete room", self.store.delete_room(room_id)).await?;
        if !deleted {
            return Err(Error::NotFound(format!("Room {room_id} not found")));
        }
        info!(room_id = %room_id, "Room deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRoomStore;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(Arc::new(MemoryRoomStore::new()), &RoomConfig::default())
    }

    #[tokio::test]
    async fn test_create_initializes_paused_state() {
        let registry = registry();
        let room = registry
            .create(UserId::from("host"), String::new(), "video".to_string())
            .await
            .unwrap();

        assert_eq!(room.code.len(), 6);
        assert!(!room.playback.is_playing);
        assert_eq!(room.playback.position_seconds, 0.0);
        assert_eq!(registry.get(&room.id).await.unwrap(), room);
        assert_eq!(registry.get_by_code(&room.code).await.unwrap().id, room.id);
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let registry = registry();
        let room = registry
            .create(UserId::from("host"), String::new(), "video".to_string())
            .await
            .unwrap();

        let lowered = room.code.to_lowercase();
        if lowered != room.code {
            assert!(matches!(
                registry.get_by_code(&lowered).await,
                Err(Error::NotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_delete_unknown_room_is_not_found() {
        let registry = registry();
        assert!(matches!(
            registry.delete(&RoomId::new()).await,
            Err(Error::NotFound(_))
        ));
    }
}
