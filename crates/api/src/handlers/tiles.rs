//! Handler for committing a finished tile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use quilt_placement::CommitRequest;

use crate::error::AppResult;
use crate::handlers::boards::TileView;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/tiles
///
/// Commit a tile at `(x, y)`. Needs `claim_id` unless this is the board's
/// first tile at the origin.
pub async fn commit(
    State(state): State<AppState>,
    Json(input): Json<CommitRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TileView>>)> {
    let tile = state.committer.commit(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: tile.into() }),
    ))
}
