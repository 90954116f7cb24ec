use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};

use super::RoomStore;
use crate::{
    models::{NewRoom, PlaybackState, Room, RoomId, RoomMember, UserId},
    Error, Result,
};

const ROOM_COLUMNS: &str = "id, code, name, host_id, video_ref, is_playing, position_seconds, \
                            playback_updated_at, created_at, updated_at";

/// `PostgreSQL`-backed room store
#[derive(Clone)]
pub struct PgRoomStore {
    pool: PgPool,
}

impl PgRoomStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_room(row: &PgRow) -> Result<Room> {
        Ok(Room {
            id: RoomId::from_string(row.try_get("id")?),
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            host_id: UserId::from_string(row.try_get("host_id")?),
            video_ref: row.try_get("video_ref")?,
            playback: PlaybackState {
                is_playing: row.try_get("is_playing")?,
                position_seconds: row.try_get("position_seconds")?,
                updated_at: row.try_get("playback_updated_at")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_member(row: &PgRow) -> Result<RoomMember> {
        Ok(RoomMember {
            room_id: RoomId::from_string(row.try_get("room_id")?),
            user_id: UserId::from_string(row.try_get("user_id")?),
            joined_at: row.try_get("joined_at")?,
        })
    }
}

impl std::fmt::Debug for PgRoomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgRoomStore").finish()
    }
}

#[async_trait]
impl RoomStore for PgRoomStore {
    async fn insert_room(&self, new: NewRoom) -> Result<Room> {
        let room = Room::from_new(new, RoomId::new(), Utc::now());

        // The partial unique index on live codes turns a collision into 23505.
        let row = sqlx::query(&format!(
            "INSERT INTO rooms (id, code, name, host_id, video_ref, is_playing, position_seconds,
                                playback_updated_at, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(room.id.as_str())
        .bind(&room.code)
        .bind(&room.name)
        .bind(room.host_id.as_str())
        .bind(&room.video_ref)
        .bind(room.playback.is_playing)
        .bind(room.playback.position_seconds)
        .bind(room.playback.updated_at)
        .bind(room.created_at)
        .bind(room.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_room(&row)
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>> {
        let row = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(room_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_room).transpose()
    }

    async fn get_room_by_code(&self, code: &str) -> Result<Option<Room>> {
        let row = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE code = $1 AND deleted_at IS NULL"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_room).transpose()
    }

    async fn save_room(&self, room: &Room) -> Result<Room> {
        let row = sqlx::query(&format!(
            "UPDATE rooms
             SET name = $2, video_ref = $3, is_playing = $4, position_seconds = $5,
                 playback_updated_at = GREATEST(playback_updated_at, $6),
                 updated_at = GREATEST(updated_at, CURRENT_TIMESTAMP)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {ROOM_COLUMNS}"
        ))
        .bind(room.id.as_str())
        .bind(&room.name)
        .bind(&room.video_ref)
        .bind(room.playback.is_playing)
        .bind(room.playback.position_seconds)
        .bind(room.playback.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_room(&row),
            None => Err(Error::NotFound(format!("Room {} not found", room.id))),
        }
    }

    async fn delete_room(&self, room_id: &RoomId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE rooms SET deleted_at = CURRENT_TIMESTAMP
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(room_id.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM room_members WHERE room_id = $1")
            .bind(room_id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn add_member(&self, member: RoomMember) -> Result<RoomMember> {
        // Only live rooms accept members; a soft-deleted room yields no row.
        let inserted = sqlx::query(
            "INSERT INTO room_members (room_id, user_id, joined_at)
             SELECT id, $2, $3 FROM rooms WHERE id = $1 AND deleted_at IS NULL
             ON CONFLICT (room_id, user_id) DO NOTHING
             RETURNING room_id, user_id, joined_at",
        )
        .bind(member.room_id.as_str())
        .bind(member.user_id.as_str())
        .bind(member.joined_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Self::row_to_member(&row);
        }

        let existing = sqlx::query(
            "SELECT m.room_id, m.user_id, m.joined_at
             FROM room_members m
             JOIN rooms r ON r.id = m.room_id AND r.deleted_at IS NULL
             WHERE m.room_id = $1 AND m.user_id = $2",
        )
        .bind(member.room_id.as_str())
        .bind(member.user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(row) => Self::row_to_member(&row),
            None => Err(Error::NotFound(format!("Room {} not found", member.room_id))),
        }
    }

    async fn list_members(&self, room_id: &RoomId) -> Result<Vec<RoomMember>> {
        let rows = sqlx::query(
            "SELECT room_id, user_id, joined_at
             FROM room_members
             WHERE room_id = $1
             ORDER BY joined_at ASC, id ASC",
        )
        .bind(room_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_member).collect()
    }
}
