//! Route definitions for the public `/boards` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{boards, feed};
use crate::state::AppState;

/// Routes mounted at `/boards`.
///
/// ```text
/// GET /                 -> list_published
/// GET /stream           -> feed::stream (SSE)
/// GET /{id}             -> get_snapshot
/// GET /{id}/assemble    -> assemble
/// GET /{id}/seeds       -> seeds
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(boards::list_published))
        .route("/stream", get(feed::stream))
        .route("/{id}", get(boards::get_snapshot))
        .route("/{id}/assemble", get(boards::assemble))
        .route("/{id}/seeds", get(boards::seeds))
}
