//! Handlers for claiming, renewing and releasing a cell.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use quilt_core::types::{DbId, Timestamp};
use quilt_db::models::tile::Tile;
use quilt_placement::{ClaimGrant, ClaimRequest};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::boards::ClaimView;
use crate::response::{Ack, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for renew and release.
#[derive(Debug, Deserialize)]
pub struct ClaimAction {
    pub claim_id: DbId,
    pub user_id: String,
}

/// The tile a claim extends, so the client can seed its canvas.
#[derive(Debug, Serialize)]
pub struct SourceTile {
    pub id: DbId,
    pub x: i32,
    pub y: i32,
    pub image_data: String,
}

impl From<Tile> for SourceTile {
    fn from(tile: Tile) -> Self {
        Self {
            id: tile.id,
            x: tile.x,
            y: tile.y,
            image_data: tile.image_data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub claim: ClaimView,
    pub from_tile: SourceTile,
    /// Cadence at which the holder should renew.
    pub renew_interval_secs: i64,
}

impl From<ClaimGrant> for ClaimResponse {
    fn from(grant: ClaimGrant) -> Self {
        Self {
            claim: grant.claim.into(),
            from_tile: grant.from_tile.into(),
            renew_interval_secs: grant.renew_interval_secs,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenewResponse {
    pub ok: bool,
    pub expires_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/claims
///
/// Claim the cell next to `from_tile_id` on `side`.
pub async fn claim(
    State(state): State<AppState>,
    Json(input): Json<ClaimRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ClaimResponse>>)> {
    let grant = state.claims.claim(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: grant.into() }),
    ))
}

/// POST /api/v1/claims/renew
///
/// Extend a live claim held by `user_id` to a full draw window from now.
pub async fn renew(
    State(state): State<AppState>,
    Json(input): Json<ClaimAction>,
) -> AppResult<Json<DataResponse<RenewResponse>>> {
    let claim = state.claims.renew(input.claim_id, &input.user_id).await?;
    Ok(Json(DataResponse {
        data: RenewResponse {
            ok: true,
            expires_at: claim.expires_at,
        },
    }))
}

/// POST /api/v1/claims/release
pub async fn release(
    State(state): State<AppState>,
    Json(input): Json<ClaimAction>,
) -> AppResult<Json<DataResponse<Ack>>> {
    state.claims.release(input.claim_id, &input.user_id).await?;
    Ok(Json(DataResponse { data: Ack::ok() }))
}
