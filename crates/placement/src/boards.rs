//! Board administration: create, list, publish, delete and seed.
//!
//! The owner string is whatever the admin session layer vouches for; this
//! module only checks that it matches the board's creator.

use quilt_core::claims::normalize_board_name;
use quilt_core::composition::placeholder_tile;
use quilt_core::grid::{validate_board_size, Cell};
use quilt_core::types::DbId;
use quilt_db::models::board::{Board, CreateBoard};
use quilt_db::models::tile::CreateTile;
use quilt_events::BoardEvent;
use serde::{Deserialize, Serialize};

use crate::context::ProtocolContext;
use crate::error::{PlacementError, PlacementResult};

/// Creator recorded on placeholder tiles.
pub const SEED_CREATOR: &str = "seed";

/// Tiles inserted by a seed run without `fill_all`.
pub const PARTIAL_SEED_LIMIT: usize = 6;

fn default_fill_all() -> bool {
    true
}

/// Options for [`BoardAdmin::seed`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SeedOptions {
    /// Delete every tile (and with them every claim) first.
    #[serde(default)]
    pub replace: bool,
    /// Fill every empty cell instead of at most [`PARTIAL_SEED_LIMIT`].
    #[serde(default = "default_fill_all")]
    pub fill_all: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            replace: false,
            fill_all: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    pub removed: u64,
    pub inserted: usize,
}

#[derive(Clone)]
pub struct BoardAdmin {
    ctx: ProtocolContext,
}

impl BoardAdmin {
    pub fn new(ctx: ProtocolContext) -> Self {
        Self { ctx }
    }

    /// Create a published board. A blank name becomes `"Untitled"`, a
    /// missing or non-positive size falls back to the configured default.
    pub async fn create(
        &self,
        name: Option<&str>,
        size: Option<i32>,
        owner: &str,
    ) -> PlacementResult<Board> {
        let name = normalize_board_name(name)?;
        let size = size
            .filter(|s| *s > 0)
            .unwrap_or(self.ctx.settings.default_board_size);
        validate_board_size(size)?;

        let board = self
            .ctx
            .store
            .create_board(
                &CreateBoard {
                    name,
                    size,
                    created_by: owner.to_string(),
                },
                self.ctx.now(),
            )
            .await?;
        tracing::info!(board_id = board.id, size, owner, "Board created");
        Ok(board)
    }

    /// Boards created by `owner`, newest first.
    pub async fn list(&self, owner: &str) -> PlacementResult<Vec<Board>> {
        Ok(self.ctx.store.list_boards_by_owner(owner).await?)
    }

    pub async fn set_published(
        &self,
        board_id: DbId,
        owner: &str,
        published: bool,
    ) -> PlacementResult<()> {
        if !self
            .ctx
            .store
            .set_board_published(board_id, owner, published)
            .await?
        {
            return Err(PlacementError::BoardNotFound(board_id));
        }
        tracing::info!(board_id, published, "Board publication changed");
        Ok(())
    }

    /// Delete a board with its tiles and claims.
    pub async fn delete(&self, board_id: DbId, owner: &str) -> PlacementResult<()> {
        if !self.ctx.store.delete_board(board_id, owner).await? {
            return Err(PlacementError::BoardNotFound(board_id));
        }
        tracing::info!(board_id, "Board deleted");
        Ok(())
    }

    /// Fill empty cells row-major with labelled placeholder tiles.
    pub async fn seed(&self, board_id: DbId, options: SeedOptions) -> PlacementResult<SeedOutcome> {
        let board = self.ctx.require_board(board_id).await?;

        let removed = if options.replace {
            self.ctx.store.delete_tiles(board.id).await?
        } else {
            0
        };

        let now = self.ctx.now();
        let mut inserted = 0;
        'rows: for y in 0..board.size {
            for x in 0..board.size {
                if !options.fill_all && inserted >= PARTIAL_SEED_LIMIT {
                    break 'rows;
                }
                let cell = Cell::new(x, y);
                let input = CreateTile {
                    board_id: board.id,
                    cell,
                    image_data: placeholder_tile(cell),
                    created_by: SEED_CREATOR.to_string(),
                };
                if self.ctx.store.insert_tile_if_empty(&input, now).await?.is_some() {
                    inserted += 1;
                }
            }
        }

        if removed > 0 || inserted > 0 {
            self.ctx.notifier.publish(BoardEvent::tiles(board.id));
        }
        tracing::info!(board_id, removed, inserted, "Board seeded");
        Ok(SeedOutcome { removed, inserted })
    }
}
