//! Exactly-once fill of a cell.
//!
//! The tile insert is the conditional write that decides races: whatever the
//! earlier checks saw, only one insert per cell returns a row.

use quilt_core::claims::{validate_image_data, validate_user_token};
use quilt_core::grid::Cell;
use quilt_core::types::DbId;
use quilt_db::models::tile::{CreateTile, Tile};
use quilt_events::BoardEvent;
use serde::Deserialize;

use crate::context::ProtocolContext;
use crate::error::{PlacementError, PlacementResult};

/// Input for [`PlacementCommitter::commit`].
#[derive(Debug, Clone, Deserialize)]
pub struct CommitRequest {
    pub board_id: DbId,
    pub x: i32,
    pub y: i32,
    pub image_data: String,
    pub user_id: String,
    /// Required on every commit except a board's first tile.
    #[serde(default)]
    pub claim_id: Option<DbId>,
}

impl CommitRequest {
    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y)
    }
}

#[derive(Clone)]
pub struct PlacementCommitter {
    ctx: ProtocolContext,
}

impl PlacementCommitter {
    pub fn new(ctx: ProtocolContext) -> Self {
        Self { ctx }
    }

    /// Commit a finished tile.
    ///
    /// Once the requester's claim has been looked up it is consumed, whether
    /// the commit then succeeds or not.
    pub async fn commit(&self, req: &CommitRequest) -> PlacementResult<Tile> {
        validate_user_token(&req.user_id)?;
        validate_image_data(&req.image_data)?;

        let board = self.ctx.require_board(req.board_id).await?;
        let cell = req.cell();
        if !cell.in_bounds(board.size) {
            return Err(PlacementError::OutOfBounds(cell));
        }

        // Count before the cell check: a first tile landing in between is
        // then reported as TileExists rather than ClaimRequired.
        let has_tiles = self.ctx.store.count_tiles(board.id).await? > 0;
        if self.ctx.store.tile_at(board.id, cell).await?.is_some() {
            return Err(PlacementError::TileExists(cell));
        }

        let now = self.ctx.now();
        let consumed_claim = if has_tiles {
            let claim_id = req.claim_id.ok_or(PlacementError::ClaimRequired)?;
            let claim = self
                .ctx
                .store
                .delete_claim(claim_id, &req.user_id)
                .await?
                .ok_or(PlacementError::ClaimNotFound)?;

            if claim.board_id != board.id || claim.cell() != cell {
                tracing::debug!(claim_id, board_id = board.id, %cell, "Claim target mismatch");
                self.ctx.notifier.publish(BoardEvent::locks(claim.board_id));
                return Err(PlacementError::ClaimMismatch);
            }
            if !claim.is_live(now) {
                tracing::debug!(claim_id, board_id = board.id, %cell, "Claim expired before commit");
                self.ctx.notifier.publish(BoardEvent::locks(board.id));
                return Err(PlacementError::ClaimExpired);
            }
            true
        } else {
            if !cell.is_origin() {
                return Err(PlacementError::FirstTileMustBeOrigin);
            }
            false
        };

        let input = CreateTile {
            board_id: board.id,
            cell,
            image_data: req.image_data.clone(),
            created_by: req.user_id.clone(),
        };
        let Some(tile) = self.ctx.store.insert_tile_if_empty(&input, now).await? else {
            if consumed_claim {
                self.ctx.notifier.publish(BoardEvent::locks(board.id));
            }
            return Err(PlacementError::TileExists(cell));
        };

        tracing::info!(
            board_id = board.id,
            tile_id = tile.id,
            x = cell.x,
            y = cell.y,
            first_tile = !consumed_claim,
            "Tile committed"
        );
        self.ctx.notifier.publish(BoardEvent::tiles(board.id));
        Ok(tile)
    }
}
