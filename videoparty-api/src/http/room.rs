// Room HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    Stream, StreamExt,
};
use videoparty_core::models::{CreateRoomRequest, PlaybackState, Room, RoomMember};

use super::{middleware::BearerToken, AppResult, AppState};

/// Playback update request
#[derive(Debug, Deserialize)]
pub struct UpdateStateRequest {
    pub is_playing: bool,
    #[serde(alias = "current_time")]
    pub position_seconds: f64,
}

/// Playback state as seen by clients
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaybackResponse {
    pub is_playing: bool,
    pub position_seconds: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<PlaybackState> for PlaybackResponse {
    fn from(state: PlaybackState) -> Self {
        Self {
            is_playing: state.is_playing,
            position_seconds: state.position_seconds,
            updated_at: state.updated_at,
        }
    }
}

/// Room response
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub host_id: String,
    pub video_ref: String,
    pub playback: PlaybackResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id.0,
            code: room.code,
            name: room.name,
            host_id: room.host_id.0,
            video_ref: room.video_ref,
            playback: room.playback.into(),
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

/// Member response
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
}

impl From<RoomMember> for MemberResponse {
    fn from(member: RoomMember) -> Self {
        Self {
            user_id: member.user_id.0,
            joined_at: member.joined_at,
        }
    }
}

/// Create a room hosted by the caller
pub async fn create_room(
    State(state): State<AppState>,
    token: BearerToken,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RoomResponse>)> {
    let Json(req) = payload?;
    let room = state.session.create_room(token.as_str(), req).await?;
    Ok((StatusCode::CREATED, Json(room.into())))
}

/// Fetch a room by code (public)
pub async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<RoomResponse>> {
    let room = state.session.get_room(&code).await?;
    Ok(Json(room.into()))
}

/// Join a room by code
pub async fn join_room(
    State(state): State<AppState>,
    token: BearerToken,
    Path(code): Path<String>,
) -> AppResult<Json<RoomResponse>> {
    let room = state.session.join_room(token.as_str(), &code).await?;
    Ok(Json(room.into()))
}

/// Play, pause or seek (host only)
pub async fn update_state(
    State(state): State<AppState>,
    token: BearerToken,
    Path(code): Path<String>,
    payload: Result<Json<UpdateStateRequest>, JsonRejection>,
) -> AppResult<Json<RoomResponse>> {
    let Json(req) = payload?;
    let room = state
        .session
        .update_state(token.as_str(), &code, req.is_playing, req.position_seconds)
        .await?;
    Ok(Json(room.into()))
}

/// List members in join order (public)
pub async fn get_room_members(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Vec<MemberResponse>>> {
    let members = state.session.list_members(&code).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// Delete a room (host only)
pub async fn delete_room(
    State(state): State<AppState>,
    token: BearerToken,
    Path(code): Path<String>,
) -> AppResult<StatusCode> {
    state.session.delete_room(token.as_str(), &code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Server-sent feed of committed playback changes (public)
///
/// Each change arrives as a `playback` event. The stream ends when the room is deleted.
pub async fn room_events(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let receiver = state.session.subscribe(&code).await?;

    let stream = BroadcastStream::new(receiver).filter_map(|message| match message {
        Ok(event) => Some(
            Event::default()
                .event("playback")
                .json_data(PlaybackResponse::from(event.playback)),
        ),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!(skipped, "Event subscriber lagged, skipping to newest");
            None
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
