//! Public board handlers: list, snapshot, composed image and neighbor seeds.

use axum::extract::{Path, Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use quilt_core::grid::{BoardPhase, Cell, OpenEdge};
use quilt_core::types::{DbId, Timestamp};
use quilt_db::models::board::Board;
use quilt_db::models::claim::TileClaim;
use quilt_db::models::tile::Tile;
use quilt_placement::{BoardSnapshot, NeighborStrip};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Entry in the public board list.
#[derive(Debug, Serialize)]
pub struct BoardSummary {
    pub id: DbId,
    pub name: String,
    pub size: i32,
    pub created_at: Timestamp,
}

impl From<Board> for BoardSummary {
    fn from(board: Board) -> Self {
        Self {
            id: board.id,
            name: board.name,
            size: board.size,
            created_at: board.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BoardInfo {
    pub id: DbId,
    pub name: String,
    pub size: i32,
    pub published: bool,
}

#[derive(Debug, Serialize)]
pub struct TileView {
    pub id: DbId,
    pub x: i32,
    pub y: i32,
    pub image_data: String,
    pub created_by: String,
    pub created_at: Timestamp,
}

impl From<Tile> for TileView {
    fn from(tile: Tile) -> Self {
        Self {
            id: tile.id,
            x: tile.x,
            y: tile.y,
            image_data: tile.image_data,
            created_by: tile.created_by,
            created_at: tile.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimView {
    pub id: DbId,
    pub x: i32,
    pub y: i32,
    pub side: String,
    pub user_id: String,
    pub from_tile_id: DbId,
    pub expires_at: Timestamp,
}

impl From<TileClaim> for ClaimView {
    fn from(claim: TileClaim) -> Self {
        Self {
            id: claim.id,
            x: claim.x,
            y: claim.y,
            side: claim.side,
            user_id: claim.user_id,
            from_tile_id: claim.from_tile_id,
            expires_at: claim.expires_at,
        }
    }
}

/// Full board state for rendering and picking an edge.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub board: BoardInfo,
    pub tiles: Vec<TileView>,
    pub claims: Vec<ClaimView>,
    pub open_edges: Vec<OpenEdge>,
    pub phase: BoardPhase,
    pub origin_open: bool,
    pub server_time: Timestamp,
}

impl From<BoardSnapshot> for SnapshotResponse {
    fn from(snapshot: BoardSnapshot) -> Self {
        Self {
            board: BoardInfo {
                id: snapshot.board.id,
                name: snapshot.board.name,
                size: snapshot.board.size,
                published: snapshot.board.published,
            },
            tiles: snapshot.tiles.into_iter().map(TileView::from).collect(),
            claims: snapshot.claims.into_iter().map(ClaimView::from).collect(),
            open_edges: snapshot.open_edges,
            phase: snapshot.phase,
            origin_open: snapshot.origin_open,
            server_time: snapshot.server_time,
        }
    }
}

/// Query for `GET /boards/{id}/seeds`.
#[derive(Debug, Deserialize)]
pub struct SeedQuery {
    pub x: i32,
    pub y: i32,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/boards
///
/// Published boards, newest first.
pub async fn list_published(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<BoardSummary>>>> {
    let boards = state.grid.published_boards().await?;
    Ok(Json(DataResponse {
        data: boards.into_iter().map(BoardSummary::from).collect(),
    }))
}

/// GET /api/v1/boards/{id}
///
/// Purges expired claims, then returns tiles, live claims and open edges.
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
) -> AppResult<Json<DataResponse<SnapshotResponse>>> {
    let snapshot = state.grid.snapshot(board_id).await?;
    Ok(Json(DataResponse {
        data: snapshot.into(),
    }))
}

/// GET /api/v1/boards/{id}/assemble
///
/// The composed board as an SVG document.
pub async fn assemble(
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let svg = state.grid.assemble(board_id).await?;
    Ok((
        [(CONTENT_TYPE, "image/svg+xml"), (CACHE_CONTROL, "no-store")],
        svg,
    ))
}

/// GET /api/v1/boards/{id}/seeds?x=&y=
///
/// Overlap strips from the filled neighbors of `(x, y)`.
pub async fn seeds(
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
    Query(query): Query<SeedQuery>,
) -> AppResult<Json<DataResponse<Vec<NeighborStrip>>>> {
    let strips = state
        .seeds
        .neighbors(board_id, Cell::new(query.x, query.y))
        .await?;
    Ok(Json(DataResponse { data: strips }))
}
