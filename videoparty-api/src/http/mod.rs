// Module: http
// HTTP/JSON REST API for rooms

pub mod error;
pub mod health;
pub mod middleware;
pub mod room;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use videoparty_core::service::RoomSessionService;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub session: RoomSessionService,
}

/// Create the HTTP router with all routes
///
/// An empty `allowed_origins` allows any origin.
pub fn create_router(session: RoomSessionService, allowed_origins: &[String]) -> Router {
    let state = AppState { session };

    Router::new()
        // Health check endpoints (for monitoring probes)
        .merge(health::create_health_router())
        // Room routes
        .route("/api/rooms", post(room::create_room))
        .route("/api/rooms/{code}", get(room::get_room).delete(room::delete_room))
        .route("/api/rooms/{code}/join", post(room::join_room))
        .route("/api/rooms/{code}/state", put(room::update_state))
        .route("/api/rooms/{code}/members", get(room::get_room_members))
        .route("/api/rooms/{code}/events", get(room::room_events))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(allowed_origins)),
        )
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
