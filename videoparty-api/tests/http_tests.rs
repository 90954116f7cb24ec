//! HTTP surface tests driving the router in-process

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use videoparty_api::create_router;
use videoparty_core::{
    config::RoomConfig,
    models::UserId,
    repository::MemoryRoomStore,
    service::{JwtIdentityProvider, RoomSessionService},
};

struct TestApp {
    router: Router,
    jwt: JwtIdentityProvider,
}

impl TestApp {
    fn new() -> Self {
        let jwt = JwtIdentityProvider::new("http-test-secret", chrono::Duration::hours(1))
            .expect("Failed to create JwtIdentityProvider");
        let session = RoomSessionService::new(
            Arc::new(jwt.clone()),
            Arc::new(MemoryRoomStore::new()),
            &RoomConfig::default(),
        );
        Self {
            router: create_router(session, &[]),
            jwt,
        }
    }

    fn token(&self, user: &str) -> String {
        self.jwt
            .sign_token(&UserId::from(user))
            .expect("Failed to sign token")
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    async fn open(&self, uri: &str) -> Response {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    async fn create_room(&self, host: &str) -> String {
        let token = self.token(host);
        let (status, body) = self
            .send(
                Method::POST,
                "/api/rooms",
                Some(&token),
                Some(json!({ "name": "Movie night", "video_ref": "https://example.com/v.mp4" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["code"].as_str().expect("code missing").to_string()
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn create_returns_created_room() {
    let app = TestApp::new();
    let token = app.token("alice");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/rooms",
            Some(&token),
            Some(json!({ "video_url": "v1" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["host_id"], "alice");
    assert_eq!(body["video_ref"], "v1");
    assert_eq!(body["code"].as_str().map(str::len), Some(6));
    assert_eq!(body["playback"]["is_playing"], false);
    assert_eq!(body["playback"]["position_seconds"], 0.0);
}

#[tokio::test]
async fn create_without_token_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/api/rooms", None, Some(json!({ "video_ref": "v1" })))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn create_with_forged_token_is_unauthorized() {
    let app = TestApp::new();
    let (status, _) = app
        .send(
            Method::POST,
            "/api/rooms",
            Some("not-a-real-token"),
            Some(json!({ "video_ref": "v1" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_with_blank_video_is_bad_request() {
    let app = TestApp::new();
    let token = app.token("alice");
    let (status, body) = app
        .send(Method::POST, "/api/rooms", Some(&token), Some(json!({ "video_ref": " " })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = TestApp::new();
    let code = app.create_room("alice").await;
    let token = app.token("alice");

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/rooms/{code}/state"),
            Some(&token),
            Some(json!({ "is_playing": "yes" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fetch_is_public_and_unknown_code_is_not_found() {
    let app = TestApp::new();
    let code = app.create_room("alice").await;

    let (status, body) = app
        .send(Method::GET, &format!("/api/rooms/{code}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], code.as_str());

    let (status, body) = app.send(Method::GET, "/api/rooms/NOPE00", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn watch_session_flow() {
    let app = TestApp::new();
    let code = app.create_room("alice").await;
    let alice = app.token("alice");
    let bob = app.token("bob");

    let (status, body) = app
        .send(Method::POST, &format!("/api/rooms/{code}/join"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], code.as_str());

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/rooms/{code}/state"),
            Some(&bob),
            Some(json!({ "is_playing": true, "position_seconds": 10.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/rooms/{code}/state"),
            Some(&alice),
            Some(json!({ "is_playing": true, "current_time": 10.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playback"]["is_playing"], true);
    assert_eq!(body["playback"]["position_seconds"], 10.0);
    let timestamp = |field: &str| {
        body[field]
            .as_str()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .unwrap_or_else(|| panic!("{field} missing or malformed: {body}"))
    };
    assert!(timestamp("updated_at") >= timestamp("created_at"));

    let (status, body) = app
        .send(Method::GET, &format!("/api/rooms/{code}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playback"]["position_seconds"], 10.0);

    let (status, body) = app
        .send(Method::GET, &format!("/api/rooms/{code}/members"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let members: Vec<&str> = body
        .as_array()
        .expect("members should be an array")
        .iter()
        .filter_map(|m| m["user_id"].as_str())
        .collect();
    assert_eq!(members, vec!["alice", "bob"]);
}

#[tokio::test]
async fn join_requires_authentication() {
    let app = TestApp::new();
    let code = app.create_room("alice").await;

    let (status, _) = app
        .send(Method::POST, &format!("/api/rooms/{code}/join"), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_host_can_delete() {
    let app = TestApp::new();
    let code = app.create_room("alice").await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/rooms/{code}"),
            Some(&app.token("bob")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/api/rooms/{code}"),
            Some(&app.token("alice")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app
        .send(Method::GET, &format!("/api/rooms/{code}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_stream_carries_host_updates_until_delete() {
    let app = TestApp::new();
    let code = app.create_room("alice").await;
    let alice = app.token("alice");

    let response = app.open(&format!("/api/rooms/{code}/events")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "text/event-stream"
    );

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/rooms/{code}/state"),
            Some(&alice),
            Some(json!({ "is_playing": true, "position_seconds": 42.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/rooms/{code}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Deleting the room closes the feed, so the body ends.
    let bytes = tokio::time::timeout(Duration::from_secs(5), response.into_body().collect())
        .await
        .expect("event stream did not end after delete")
        .expect("Failed to read body")
        .to_bytes();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("event: playback"), "unexpected stream: {text}");
    assert!(text.contains("\"position_seconds\":42.0"), "unexpected stream: {text}");
    assert!(text.contains("\"is_playing\":true"), "unexpected stream: {text}");
}

#[tokio::test]
async fn event_stream_for_unknown_code_is_not_found() {
    let app = TestApp::new();
    let response = app.open("/api/rooms/NOPE00/events").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
