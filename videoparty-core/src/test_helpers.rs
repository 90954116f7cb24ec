//! Test helpers and fixtures for videoparty-core tests

use std::sync::Arc;

use crate::{
    config::RoomConfig,
    models::{CreateRoomRequest, UserId},
    repository::MemoryRoomStore,
    service::{IdentityProvider, RoomSessionService},
    Error, Result,
};

/// Identity provider that treats the token itself as the user id.
///
/// Tokens starting with `bad` are rejected.
pub struct StaticIdentity;

impl IdentityProvider for StaticIdentity {
    fn authenticate(&self, token: &str) -> Result<UserId> {
        if token.is_empty() || token.starts_with("bad") {
            return Err(Error::Unauthenticated("Invalid token".to_string()));
        }
        Ok(UserId::from(token))
    }
}

/// Session over a fresh in-memory store
pub fn memory_session() -> RoomSessionService {
    RoomSessionService::new(
        Arc::new(StaticIdentity),
        Arc::new(MemoryRoomStore::new()),
        &RoomConfig::default(),
    )
}

pub fn create_request(video_ref: &str) -> CreateRoomRequest {
    CreateRoomRequest {
        name: None,
        video_ref: video_ref.to_string(),
    }
}
