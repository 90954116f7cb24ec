use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{RoomId, UserId};
use super::playback::PlaybackState;
use crate::{Error, Result};

pub const MAX_ROOM_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// Short shareable code, unique among live rooms. Never changes.
    pub code: String,
    pub name: String,
    /// Sole writer of the playback state. Never changes.
    pub host_id: UserId,
    /// Opaque media reference (URL or media id)
    pub video_ref: String,
    pub playback: PlaybackState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Materialize a room once the store has assigned it an id.
    #[must_use]
    pub fn from_new(new: NewRoom, id: RoomId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            code: new.code,
            name: new.name,
            host_id: new.host_id,
            video_ref: new.video_ref,
            playback: PlaybackState::initial(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_host(&self, user_id: &UserId) -> bool {
        &self.host_id == user_id
    }
}

/// Room insert payload; the store assigns `id` and timestamps
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub code: String,
    pub name: String,
    pub host_id: UserId,
    pub video_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "video_url")]
    pub video_ref: String,
}

impl CreateRoomRequest {
    /// Trim inputs and reject ones that cannot form a room.
    pub fn normalize(self) -> Result<(String, String)> {
        let video_ref = self.video_ref.trim().to_string();
        if video_ref.is_empty() {
            return Err(Error::InvalidInput("Video reference cannot be empty".to_string()));
        }

        let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
        if name.len() > MAX_ROOM_NAME_LEN {
            return Err(Error::InvalidInput("Room name too long".to_string()));
        }

        Ok((name, video_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_new_starts_paused() {
        let now = Utc::now();
        let room = Room::from_new(
            NewRoom {
                code: "ABC123".to_string(),
                name: "Movie night".to_string(),
                host_id: UserId::from("host"),
                video_ref: "v1".to_string(),
            },
            RoomId::new(),
            now,
        );

        assert_eq!(room.code, "ABC123");
        assert!(!room.playback.is_playing);
        assert_eq!(room.playback.position_seconds, 0.0);
        assert_eq!(room.created_at, room.updated_at);
        assert!(room.is_host(&UserId::from("host")));
        assert!(!room.is_host(&UserId::from("guest")));
    }

    #[test]
    fn test_normalize_rejects_blank_video_ref() {
        let req = CreateRoomRequest {
            name: None,
            video_ref: "   ".to_string(),
        };
        assert!(matches!(req.normalize(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_normalize_rejects_long_name() {
        let req = CreateRoomRequest {
            name: Some("x".repeat(MAX_ROOM_NAME_LEN + 1)),
            video_ref: "v1".to_string(),
        };
        assert!(matches!(req.normalize(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_video_url_alias_is_accepted() {
        let req: CreateRoomRequest =
            serde_json::from_str(r#"{"video_url": "https://example.com/v.mp4"}"#).unwrap();
        assert_eq!(req.video_ref, "https://example.com/v.mp4");
        assert!(req.name.is_none());
    }

    #[test]
    fn test_normalize_trims_and_defaults_name() {
        let req = CreateRoomRequest {
            name: None,
            video_ref: " https://example.com/v.mp4 ".to_string(),
        };
        let (name, video_ref) = req.normalize().unwrap();
        assert_eq!(name, "");
        assert_eq!(video_ref, "https://example.com/v.mp4");
    }
}
