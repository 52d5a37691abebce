//! Tile model and DTOs.

use quilt_core::grid::{Cell, PlacedTile};
use quilt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tiles` table. Tiles are never updated.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Tile {
    pub id: DbId,
    pub board_id: DbId,
    pub x: i32,
    pub y: i32,
    pub image_data: String,
    pub created_by: String,
    pub created_at: Timestamp,
}

impl Tile {
    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y)
    }

    pub fn placed(&self) -> PlacedTile {
        PlacedTile {
            id: self.id,
            cell: self.cell(),
        }
    }
}

/// DTO for committing a tile.
#[derive(Debug, Clone)]
pub struct CreateTile {
    pub board_id: DbId,
    pub cell: Cell,
    pub image_data: String,
    pub created_by: String,
}
