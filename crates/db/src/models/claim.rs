//! Tile claim (draw lock) model and DTOs.

use quilt_core::grid::{Cell, Side};
use quilt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tile_claims` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct TileClaim {
    pub id: DbId,
    pub board_id: DbId,
    pub x: i32,
    pub y: i32,
    /// `"right"` or `"bottom"`, the expansion that justified the claim.
    pub side: String,
    pub from_tile_id: DbId,
    pub user_id: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl TileClaim {
    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y)
    }

    /// A claim is live strictly before its expiry instant.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }
}

/// DTO for inserting a claim.
#[derive(Debug, Clone)]
pub struct CreateClaim {
    pub board_id: DbId,
    pub cell: Cell,
    pub side: Side,
    pub from_tile_id: DbId,
    pub user_id: String,
    pub expires_at: Timestamp,
}

/// Outcome of a conditional claim insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimInsert {
    Inserted(TileClaim),
    /// A tile already occupies the cell.
    CellFilled,
    /// Another live claim holds the cell. The holder's expiry is reported
    /// when it could still be read back.
    CellLocked { expires_at: Option<Timestamp> },
}
