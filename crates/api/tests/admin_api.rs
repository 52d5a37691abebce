//! Admin session and board management over HTTP.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{
    assert_error, body_json, get, get_auth, post_json, post_json_auth, send, TestApp, ADMIN_EMAIL,
    ADMIN_PASSWORD,
};
use quilt_api::auth::jwt::generate_access_token;
use serde_json::json;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Login / me / logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_sets_session_cookie() {
    let t = TestApp::new();
    let response = post_json(
        t.app(),
        "/api/v1/auth/login",
        json!({ "email": "  Admin@Example.com ", "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with("admin_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=3600"));

    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], ADMIN_EMAIL);
    assert_eq!(json["data"]["role"], "admin");
    assert_eq!(json["data"]["expires_in"], 3600);
    assert!(json["data"]["access_token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let t = TestApp::new();

    let response = post_json(
        t.app(),
        "/api/v1/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let response = post_json(
        t.app(),
        "/api/v1/auth/login",
        json!({ "email": "someone@example.com", "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let response = post_json(
        t.app(),
        "/api/v1/auth/login",
        json!({ "email": "", "password": "" }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
}

#[tokio::test]
async fn me_reports_session_state() {
    let t = TestApp::new();

    let json = body_json(get(t.app(), "/api/v1/auth/me").await).await;
    assert_eq!(json["data"]["authenticated"], false);
    assert!(json["data"].get("email").is_none());

    let token = t.admin_token().await;
    let json = body_json(get_auth(t.app(), "/api/v1/auth/me", &token).await).await;
    assert_eq!(json["data"]["authenticated"], true);
    assert_eq!(json["data"]["email"], ADMIN_EMAIL);
    assert!(json["data"]["expires_at"].is_string());
}

#[tokio::test]
async fn logout_clears_cookie() {
    let t = TestApp::new();
    let response = send(t.app(), Method::POST, "/api/v1/auth/logout", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(cookie.starts_with("admin_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_require_session() {
    let t = TestApp::new();

    let response = get(t.app(), "/api/v1/admin/boards").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let response = get_auth(t.app(), "/api/v1/admin/boards", "not-a-jwt").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn non_admin_role_is_forbidden() {
    let t = TestApp::new();
    let token = generate_access_token(ADMIN_EMAIL, "viewer", &t.state.config.jwt).unwrap();

    let response = get_auth(t.app(), "/api/v1/admin/boards", &token).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[tokio::test]
async fn session_cookie_authenticates() {
    let t = TestApp::new();
    let token = t.admin_token().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/admin/boards")
        .header("Cookie", format!("theme=dark; admin_session={token}"))
        .body(Body::empty())
        .unwrap();
    let response = t.app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Board management
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_publish_and_delete_board() {
    let t = TestApp::new();
    let token = t.admin_token().await;

    let response = post_json_auth(
        t.app(),
        "/api/v1/admin/boards",
        json!({ "name": "  Spring wall  ", "size": 4 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Spring wall");
    assert_eq!(json["data"]["size"], 4);
    assert_eq!(json["data"]["created_by"], ADMIN_EMAIL);
    let board_id = json["data"]["id"].as_i64().unwrap();

    // Defaults apply when name and size are missing.
    let json = body_json(
        post_json_auth(t.app(), "/api/v1/admin/boards", json!({}), &token).await,
    )
    .await;
    assert_eq!(json["data"]["name"], "Untitled");
    assert_eq!(json["data"]["size"], 5);

    let json = body_json(get_auth(t.app(), "/api/v1/admin/boards", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    // Unpublish hides it from the public list.
    let response = send(
        t.app(),
        Method::PATCH,
        "/api/v1/admin/boards",
        Some(json!({ "board_id": board_id, "published": false })),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(get(t.app(), "/api/v1/boards").await).await;
    let public = json["data"].as_array().unwrap();
    assert_eq!(public.len(), 1);
    assert_ne!(public[0]["id"], board_id);

    let response = send(
        t.app(),
        Method::DELETE,
        "/api/v1/admin/boards",
        Some(json!({ "board_id": board_id })),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(t.app(), &format!("/api/v1/boards/{board_id}")).await;
    assert_error(response, StatusCode::NOT_FOUND, "BOARD_NOT_FOUND").await;
}

#[tokio::test]
async fn invalid_board_size_is_rejected() {
    let t = TestApp::new();
    let token = t.admin_token().await;

    let response = post_json_auth(
        t.app(),
        "/api/v1/admin/boards",
        json!({ "size": 500 }),
        &token,
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn deleting_unknown_board_is_404() {
    let t = TestApp::new();
    let token = t.admin_token().await;

    let response = send(
        t.app(),
        Method::DELETE,
        "/api/v1/admin/boards",
        Some(json!({ "board_id": 777 })),
        Some(&token),
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "BOARD_NOT_FOUND").await;
}

#[tokio::test]
async fn seed_fills_empty_cells() {
    let t = TestApp::new();
    let token = t.admin_token().await;
    let (board_id, _) = t.board_with_origin(3).await;

    let response = post_json_auth(
        t.app(),
        &format!("/api/v1/admin/boards/{board_id}/seed"),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["removed"], 0);
    assert_eq!(json["data"]["inserted"], 8);

    let json = body_json(get(t.app(), &format!("/api/v1/boards/{board_id}")).await).await;
    assert_eq!(json["data"]["tiles"].as_array().unwrap().len(), 9);
    assert_eq!(json["data"]["phase"], "complete");
}
