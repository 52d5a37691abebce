//! Claim lifecycle: claim, renew, release.
//!
//! Expiry is never swept in the background. Every operation that needs to
//! trust a claim's liveness either purges expired claims first or filters on
//! `expires_at > now` in the same conditional store call.

use quilt_core::claims::validate_user_token;
use quilt_core::grid::{expansion_target, Cell, Side};
use quilt_core::types::DbId;
use quilt_db::models::claim::{ClaimInsert, CreateClaim, TileClaim};
use quilt_db::models::tile::Tile;
use quilt_events::BoardEvent;
use serde::Deserialize;

use crate::context::ProtocolContext;
use crate::error::{PlacementError, PlacementResult};

/// Input for [`ClaimManager::claim`].
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimRequest {
    pub board_id: DbId,
    pub from_tile_id: DbId,
    /// `"right"` or `"bottom"`.
    pub side: String,
    pub user_id: String,
}

/// A granted claim plus what the client needs to start drawing.
#[derive(Debug, Clone)]
pub struct ClaimGrant {
    pub claim: TileClaim,
    /// The tile the claim extends; its image seeds the new canvas.
    pub from_tile: Tile,
    /// How often the holder should renew.
    pub renew_interval_secs: i64,
}

/// Admission into the drawing state for a cell.
#[derive(Clone)]
pub struct ClaimManager {
    ctx: ProtocolContext,
}

impl ClaimManager {
    pub fn new(ctx: ProtocolContext) -> Self {
        Self { ctx }
    }

    /// Claim the cell next to `from_tile_id` on `side`.
    ///
    /// First requester wins: a cell held by a live claim is rejected with
    /// [`PlacementError::TileLocked`] and the caller has to pick another edge.
    pub async fn claim(&self, req: &ClaimRequest) -> PlacementResult<ClaimGrant> {
        validate_user_token(&req.user_id)?;
        let side: Side = req
            .side
            .parse()
            .map_err(|_| PlacementError::InvalidSide(req.side.clone()))?;

        let board = self.ctx.require_board(req.board_id).await?;
        let from_tile = self
            .ctx
            .store
            .find_tile(req.from_tile_id)
            .await?
            .filter(|t| t.board_id == board.id)
            .ok_or(PlacementError::SourceTileNotFound(req.from_tile_id))?;

        let target = expansion_target(from_tile.cell(), side, board.size).ok_or_else(|| {
            let (dx, dy) = side.delta();
            PlacementError::OutOfBounds(Cell::new(from_tile.x + dx, from_tile.y + dy))
        })?;

        let now = self.ctx.now();
        self.ctx.purge_expired(board.id, now).await?;

        if self.ctx.store.tile_at(board.id, target).await?.is_some() {
            return Err(PlacementError::TileExists(target));
        }

        let input = CreateClaim {
            board_id: board.id,
            cell: target,
            side,
            from_tile_id: from_tile.id,
            user_id: req.user_id.clone(),
            expires_at: now + self.ctx.settings.draw_duration(),
        };

        match self.ctx.store.insert_claim_if_free(&input, now).await? {
            ClaimInsert::Inserted(claim) => {
                tracing::info!(
                    board_id = board.id,
                    claim_id = claim.id,
                    x = target.x,
                    y = target.y,
                    side = side.as_str(),
                    "Claim granted"
                );
                self.ctx.notifier.publish(BoardEvent::locks(board.id));
                Ok(ClaimGrant {
                    claim,
                    from_tile,
                    renew_interval_secs: self.ctx.settings.renew_interval_secs,
                })
            }
            ClaimInsert::CellFilled => Err(PlacementError::TileExists(target)),
            ClaimInsert::CellLocked { expires_at } => Err(PlacementError::TileLocked {
                cell: target,
                expires_at,
            }),
        }
    }

    /// Extend a live claim held by `user_id` to `now + draw duration`.
    ///
    /// Unknown id, foreign owner and already-expired all report
    /// [`PlacementError::ClaimNotFound`].
    pub async fn renew(&self, claim_id: DbId, user_id: &str) -> PlacementResult<TileClaim> {
        validate_user_token(user_id)?;
        let now = self.ctx.now();
        let expires_at = now + self.ctx.settings.draw_duration();

        let claim = self
            .ctx
            .store
            .renew_claim(claim_id, user_id, now, expires_at)
            .await?
            .ok_or(PlacementError::ClaimNotFound)?;

        tracing::debug!(claim_id, board_id = claim.board_id, %expires_at, "Claim renewed");
        Ok(claim)
    }

    /// Give up a claim immediately, reopening its cell.
    pub async fn release(&self, claim_id: DbId, user_id: &str) -> PlacementResult<TileClaim> {
        validate_user_token(user_id)?;
        let claim = self
            .ctx
            .store
            .delete_claim(claim_id, user_id)
            .await?
            .ok_or(PlacementError::ClaimNotFound)?;

        tracing::info!(
            claim_id,
            board_id = claim.board_id,
            x = claim.x,
            y = claim.y,
            "Claim released"
        );
        self.ctx.notifier.publish(BoardEvent::locks(claim.board_id));
        Ok(claim)
    }
}
