//! Route definitions for the `/claims` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::claims;
use crate::state::AppState;

/// Routes mounted at `/claims`.
///
/// ```text
/// POST /          -> claim
/// POST /renew     -> renew
/// POST /release   -> release
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(claims::claim))
        .route("/renew", post(claims::renew))
        .route("/release", post(claims::release))
}
