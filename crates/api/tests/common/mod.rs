//! Shared helpers for API integration tests.
//!
//! The app is built with [`build_app_router`], so requests pass through the
//! production middleware stack, over a `MemoryTileStore` and a
//! `ManualClock`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use quilt_core::clock::ManualClock;
use quilt_core::settings::CollageSettings;
use quilt_core::types::DbId;
use quilt_db::{MemoryTileStore, TileStore};
use quilt_events::ChangeNotifier;
use quilt_placement::ProtocolContext;
use tower::ServiceExt;

use quilt_api::auth::jwt::JwtConfig;
use quilt_api::auth::password::hash_password;
use quilt_api::config::{AdminCredential, ServerConfig};
use quilt_api::router::build_app_router;
use quilt_api::state::AppState;
use quilt_api::ws::WsManager;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery-staple";

/// Build a test `ServerConfig` with safe defaults and one admin account.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        collage: CollageSettings::default(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_mins: 60,
        },
        admin: Some(AdminCredential {
            email: ADMIN_EMAIL.to_string(),
            password_hash: hash_password(ADMIN_PASSWORD).expect("hashing should succeed"),
        }),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let config = test_config();
        let ctx = ProtocolContext::new(
            Arc::new(MemoryTileStore::new()) as Arc<dyn TileStore>,
            clock.clone(),
            Arc::new(ChangeNotifier::default()),
            config.collage.clone(),
        );
        let state = AppState::new(config, ctx, Arc::new(WsManager::new()));
        Self {
            router: build_app_router(state.clone()),
            state,
            clock,
        }
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// A published board of `size` owned by the test admin.
    pub async fn board(&self, size: i32) -> DbId {
        self.state
            .admin
            .create(Some("Test board"), Some(size), ADMIN_EMAIL)
            .await
            .expect("board creation should succeed")
            .id
    }

    /// A board of `size` whose origin tile was committed over HTTP.
    /// Returns `(board_id, origin_tile_id)`.
    pub async fn board_with_origin(&self, size: i32) -> (DbId, DbId) {
        let board_id = self.board(size).await;
        let response = post_json(
            self.app(),
            "/api/v1/tiles",
            commit_body(board_id, 0, 0, "founder", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        (board_id, json["data"]["id"].as_i64().unwrap())
    }

    /// Log in as the test admin and return the session token.
    pub async fn admin_token(&self) -> String {
        let body = serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD });
        let response = post_json(self.app(), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["data"]["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

pub fn claim_body(board_id: DbId, from_tile_id: DbId, side: &str, user: &str) -> serde_json::Value {
    serde_json::json!({
        "board_id": board_id,
        "from_tile_id": from_tile_id,
        "side": side,
        "user_id": user,
    })
}

pub fn commit_body(
    board_id: DbId,
    x: i32,
    y: i32,
    user: &str,
    claim_id: Option<DbId>,
) -> serde_json::Value {
    serde_json::json!({
        "board_id": board_id,
        "x": x,
        "y": y,
        "image_data": format!("data:image/png;base64,{user}-{x}-{y}"),
        "user_id": user,
        "claim_id": claim_id,
    })
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("body should be JSON")
}

/// Assert an error response's status and machine code.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error body: {json}");
}
