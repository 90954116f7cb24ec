//! Service initialization and dependency injection

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::{
    repository::{MemoryRoomStore, PgRoomStore, RoomStore},
    service::{JwtIdentityProvider, RoomSessionService},
    Config,
};

/// Container for all initialized services
#[derive(Clone, Debug)]
pub struct Services {
    /// Room session façade used by every transport
    pub session: RoomSessionService,
    /// Token issuer/verifier backing the session's identity checks
    pub jwt: JwtIdentityProvider,
}

/// Initialize all core services
///
/// Without a pool the rooms live in process memory and vanish on restart.
pub fn init_services(pool: Option<PgPool>, config: &Config) -> anyhow::Result<Services> {
    let jwt = JwtIdentityProvider::from_config(&config.jwt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize JWT: {e}"))?;

    let store: Arc<dyn RoomStore> = match pool {
        Some(pool) => {
            info!("Using PostgreSQL room store");
            Arc::new(PgRoomStore::new(pool))
        }
        None => {
            info!("Using in-memory room store");
            Arc::new(MemoryRoomStore::new())
        }
    };

    let session = RoomSessionService::new(Arc::new(jwt.clone()), store, &config.room);
    info!("Room session service initialized");

    Ok(Services { session, jwt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateRoomRequest, UserId};

    #[tokio::test]
    async fn test_in_memory_services_round_trip() {
        let mut config = Config::default();
        config.jwt.secret = "bootstrap-test-secret".to_string();

        let services = init_services(None, &config).unwrap();
        let token = services.jwt.sign_token(&UserId::from("host")).unwrap();

        let room = services
            .session
            .create_room(
                &token,
                CreateRoomRequest {
                    name: None,
                    video_ref: "video".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(services.session.get_room(&room.code).await.unwrap().id, room.id);
    }

    #[test]
    fn test_missing_secret_fails() {
        assert!(init_services(None, &Config::default()).is_err());
    }
}
