//! Route definitions for `/admin/boards`. Every handler requires an admin
//! session.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin/boards`.
///
/// ```text
/// GET    /            -> list_boards
/// POST   /            -> create_board
/// PATCH  /            -> set_published
/// DELETE /            -> delete_board
/// POST   /{id}/seed   -> seed_board
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(admin::list_boards)
                .post(admin::create_board)
                .patch(admin::set_published)
                .delete(admin::delete_board),
        )
        .route("/{id}/seed", post(admin::seed_board))
}
