//! Neighbor overlap strips for a target cell.

use quilt_core::grid::Cell;
use quilt_core::seeding::{strip_plans, NeighborSide, PixelRect};
use quilt_core::types::DbId;
use serde::Serialize;

use crate::context::ProtocolContext;
use crate::error::{PlacementError, PlacementResult};

/// One filled neighbor's contribution to a new canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborStrip {
    /// Where the neighbor sits relative to the target.
    pub side: NeighborSide,
    pub tile_id: DbId,
    pub image_data: String,
    /// Crop rectangle inside the neighbor's image.
    pub source: PixelRect,
    /// Destination rectangle on the new canvas.
    pub dest: PixelRect,
}

#[derive(Clone)]
pub struct SeedResolver {
    ctx: ProtocolContext,
}

impl SeedResolver {
    pub fn new(ctx: ProtocolContext) -> Self {
        Self { ctx }
    }

    /// Strips from every filled orthogonal neighbor of `target`, in
    /// left, right, top, bottom order.
    pub async fn neighbors(
        &self,
        board_id: DbId,
        target: Cell,
    ) -> PlacementResult<Vec<NeighborStrip>> {
        let board = self.ctx.require_board(board_id).await?;
        if !target.in_bounds(board.size) {
            return Err(PlacementError::OutOfBounds(target));
        }

        let mut strips = Vec::new();
        for plan in strip_plans(target, board.size) {
            if let Some(tile) = self.ctx.store.tile_at(board.id, plan.neighbor).await? {
                strips.push(NeighborStrip {
                    side: plan.side,
                    tile_id: tile.id,
                    image_data: tile.image_data,
                    source: plan.source,
                    dest: plan.dest,
                });
            }
        }
        Ok(strips)
    }
}
