pub mod admin;
pub mod auth;
pub mod boards;
pub mod claims;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                               WebSocket change feed
///
/// /auth/login                       POST admin login
/// /auth/me                          GET current session
/// /auth/logout                      POST clear session
///
/// /boards                           GET published boards
/// /boards/stream                    GET SSE change feed
/// /boards/{id}                      GET snapshot
/// /boards/{id}/assemble             GET composed SVG
/// /boards/{id}/seeds                GET neighbor strips
///
/// /claims                           POST claim
/// /claims/renew                     POST renew
/// /claims/release                   POST release
///
/// /tiles                            POST commit
///
/// /admin/boards                     GET, POST, PATCH, DELETE
/// /admin/boards/{id}/seed           POST placeholder fill
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/boards", boards::router())
        .nest("/claims", claims::router())
        .route("/tiles", post(handlers::tiles::commit))
        .nest("/admin/boards", admin::router())
}
