//! Read side of the protocol: open edges, snapshots and the composed board.

use quilt_core::composition::compose_board_svg;
use quilt_core::grid::{open_edges, BoardPhase, OpenEdge, PlacedTile};
use quilt_core::types::{DbId, Timestamp};
use quilt_db::models::board::Board;
use quilt_db::models::claim::TileClaim;
use quilt_db::models::tile::Tile;

use crate::context::ProtocolContext;
use crate::error::PlacementResult;

/// Everything a client needs to render a board and pick an edge.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub board: Board,
    /// Row-major.
    pub tiles: Vec<Tile>,
    /// Live claims only.
    pub claims: Vec<TileClaim>,
    pub open_edges: Vec<OpenEdge>,
    pub phase: BoardPhase,
    /// `true` while the board awaits its first tile at the origin.
    pub origin_open: bool,
    pub server_time: Timestamp,
}

#[derive(Clone)]
pub struct GridService {
    ctx: ProtocolContext,
}

impl GridService {
    pub fn new(ctx: ProtocolContext) -> Self {
        Self { ctx }
    }

    /// Purge expired claims, then read tiles and live claims.
    pub async fn snapshot(&self, board_id: DbId) -> PlacementResult<BoardSnapshot> {
        let board = self.ctx.require_board(board_id).await?;
        let now = self.ctx.now();
        self.ctx.purge_expired(board.id, now).await?;

        let tiles = self.ctx.store.list_tiles(board.id).await?;
        let claims = self.ctx.store.list_live_claims(board.id, now).await?;

        let placed: Vec<PlacedTile> = tiles.iter().map(Tile::placed).collect();
        let edges = open_edges(board.size, &placed, claims.iter().map(TileClaim::cell));
        let phase = BoardPhase::of(board.size, tiles.len());

        Ok(BoardSnapshot {
            origin_open: phase == BoardPhase::AwaitingFirstTile,
            phase,
            open_edges: edges,
            board,
            tiles,
            claims,
            server_time: now,
        })
    }

    pub async fn open_edges(&self, board_id: DbId) -> PlacementResult<Vec<OpenEdge>> {
        Ok(self.snapshot(board_id).await?.open_edges)
    }

    /// Published boards, newest first.
    pub async fn published_boards(&self) -> PlacementResult<Vec<Board>> {
        Ok(self.ctx.store.list_published_boards().await?)
    }

    /// The board's tiles composed into one SVG document.
    pub async fn assemble(&self, board_id: DbId) -> PlacementResult<String> {
        let board = self.ctx.require_board(board_id).await?;
        let tiles = self.ctx.store.list_tiles(board.id).await?;
        Ok(compose_board_svg(
            board.size,
            tiles.iter().map(|t| (t.cell(), t.image_data.as_str())),
        ))
    }
}
