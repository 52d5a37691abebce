//! Admin board management handlers.
//!
//! Every handler requires an [`AdminUser`]; boards are scoped to the admin
//! who created them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use quilt_core::types::DbId;
use quilt_db::models::board::Board;
use quilt_placement::{SeedOptions, SeedOutcome};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AdminUser;
use crate::response::{Ack, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/boards`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBoardRequest {
    pub name: Option<String>,
    /// Side length; missing or non-positive falls back to the default.
    pub size: Option<i32>,
}

/// Request body for `PATCH /admin/boards`.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub board_id: DbId,
    pub published: bool,
}

/// Request body for `DELETE /admin/boards`.
#[derive(Debug, Deserialize)]
pub struct DeleteBoardRequest {
    pub board_id: DbId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/boards
///
/// Boards owned by the caller, including unpublished ones.
pub async fn list_boards(
    admin: AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Board>>>> {
    let boards = state.admin.list(&admin.email).await?;
    Ok(Json(DataResponse { data: boards }))
}

/// POST /api/v1/admin/boards
pub async fn create_board(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBoardRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Board>>)> {
    let board = state
        .admin
        .create(input.name.as_deref(), input.size, &admin.email)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: board })))
}

/// PATCH /api/v1/admin/boards
pub async fn set_published(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<PublishRequest>,
) -> AppResult<Json<DataResponse<Ack>>> {
    state
        .admin
        .set_published(input.board_id, &admin.email, input.published)
        .await?;
    Ok(Json(DataResponse { data: Ack::ok() }))
}

/// DELETE /api/v1/admin/boards
///
/// Deletes the board with its tiles and claims.
pub async fn delete_board(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteBoardRequest>,
) -> AppResult<Json<DataResponse<Ack>>> {
    state.admin.delete(input.board_id, &admin.email).await?;
    Ok(Json(DataResponse { data: Ack::ok() }))
}

/// POST /api/v1/admin/boards/{id}/seed
///
/// Fill empty cells with placeholder tiles.
pub async fn seed_board(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
    Json(options): Json<SeedOptions>,
) -> AppResult<Json<DataResponse<SeedOutcome>>> {
    tracing::debug!(board_id, email = %admin.email, ?options, "Seeding board");
    let outcome = state.admin.seed(board_id, options).await?;
    Ok(Json(DataResponse { data: outcome }))
}
