//! In-process [`TileStore`].
//!
//! All state sits behind one `RwLock`; every trait method takes the lock for
//! its whole duration, which makes each method a single atomic step exactly
//! like one conditional statement against the database.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use quilt_core::grid::Cell;
use quilt_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use super::{StoreResult, TileStore};
use crate::models::board::{Board, CreateBoard};
use crate::models::claim::{ClaimInsert, CreateClaim, TileClaim};
use crate::models::tile::{CreateTile, Tile};

#[derive(Default)]
struct MemoryState {
    next_id: DbId,
    boards: BTreeMap<DbId, Board>,
    tiles: BTreeMap<DbId, Tile>,
    /// (board, cell) -> tile id; the uniqueness constraint on tiles.
    tile_cells: HashMap<(DbId, Cell), DbId>,
    claims: BTreeMap<DbId, TileClaim>,
    /// (board, cell) -> claim id; at most one stored claim per cell.
    claim_cells: HashMap<(DbId, Cell), DbId>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn remove_claim(&mut self, claim_id: DbId) -> Option<TileClaim> {
        let claim = self.claims.remove(&claim_id)?;
        self.claim_cells.remove(&(claim.board_id, claim.cell()));
        Some(claim)
    }

    fn remove_claims_where(&mut self, pred: impl Fn(&TileClaim) -> bool) -> u64 {
        let doomed: Vec<DbId> = self
            .claims
            .values()
            .filter(|c| pred(c))
            .map(|c| c.id)
            .collect();
        for id in &doomed {
            self.remove_claim(*id);
        }
        doomed.len() as u64
    }

    fn remove_tiles_of(&mut self, board_id: DbId) -> u64 {
        let doomed: Vec<DbId> = self
            .tiles
            .values()
            .filter(|t| t.board_id == board_id)
            .map(|t| t.id)
            .collect();
        for id in &doomed {
            if let Some(tile) = self.tiles.remove(id) {
                self.tile_cells.remove(&(board_id, tile.cell()));
            }
        }
        // Claims reference their source tile.
        self.remove_claims_where(|c| c.board_id == board_id);
        doomed.len() as u64
    }
}

/// A [`TileStore`] held entirely in memory.
#[derive(Default)]
pub struct MemoryTileStore {
    state: RwLock<MemoryState>,
}

impl MemoryTileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut boards: Vec<Board>) -> Vec<Board> {
    boards.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    boards
}

#[async_trait]
impl TileStore for MemoryTileStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_board(&self, input: &CreateBoard, now: Timestamp) -> StoreResult<Board> {
        let mut state = self.state.write().await;
        let board = Board {
            id: state.allocate_id(),
            name: input.name.clone(),
            size: input.size,
            published: true,
            created_by: input.created_by.clone(),
            created_at: now,
        };
        state.boards.insert(board.id, board.clone());
        Ok(board)
    }

    async fn find_board(&self, board_id: DbId) -> StoreResult<Option<Board>> {
        Ok(self.state.read().await.boards.get(&board_id).cloned())
    }

    async fn list_published_boards(&self) -> StoreResult<Vec<Board>> {
        let state = self.state.read().await;
        Ok(newest_first(
            state.boards.values().filter(|b| b.published).cloned().collect(),
        ))
    }

    async fn list_boards_by_owner(&self, owner: &str) -> StoreResult<Vec<Board>> {
        let state = self.state.read().await;
        Ok(newest_first(
            state
                .boards
                .values()
                .filter(|b| b.created_by == owner)
                .cloned()
                .collect(),
        ))
    }

    async fn set_board_published(
        &self,
        board_id: DbId,
        owner: &str,
        published: bool,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.boards.get_mut(&board_id) {
            Some(board) if board.created_by == owner => {
                board.published = published;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_board(&self, board_id: DbId, owner: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let owned = state
            .boards
            .get(&board_id)
            .is_some_and(|b| b.created_by == owner);
        if !owned {
            return Ok(false);
        }
        state.remove_tiles_of(board_id);
        state.boards.remove(&board_id);
        Ok(true)
    }

    async fn find_tile(&self, tile_id: DbId) -> StoreResult<Option<Tile>> {
        Ok(self.state.read().await.tiles.get(&tile_id).cloned())
    }

    async fn tile_at(&self, board_id: DbId, cell: Cell) -> StoreResult<Option<Tile>> {
        let state = self.state.read().await;
        Ok(state
            .tile_cells
            .get(&(board_id, cell))
            .and_then(|id| state.tiles.get(id))
            .cloned())
    }

    async fn count_tiles(&self, board_id: DbId) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state.tiles.values().filter(|t| t.board_id == board_id).count() as i64)
    }

    async fn list_tiles(&self, board_id: DbId) -> StoreResult<Vec<Tile>> {
        let state = self.state.read().await;
        let mut tiles: Vec<Tile> = state
            .tiles
            .values()
            .filter(|t| t.board_id == board_id)
            .cloned()
            .collect();
        tiles.sort_by_key(|t| (t.y, t.x));
        Ok(tiles)
    }

    async fn insert_tile_if_empty(
        &self,
        input: &CreateTile,
        now: Timestamp,
    ) -> StoreResult<Option<Tile>> {
        let mut state = self.state.write().await;
        let key = (input.board_id, input.cell);
        if state.tile_cells.contains_key(&key) || !state.boards.contains_key(&input.board_id) {
            return Ok(None);
        }
        let tile = Tile {
            id: state.allocate_id(),
            board_id: input.board_id,
            x: input.cell.x,
            y: input.cell.y,
            image_data: input.image_data.clone(),
            created_by: input.created_by.clone(),
            created_at: now,
        };
        state.tile_cells.insert(key, tile.id);
        state.tiles.insert(tile.id, tile.clone());
        state.remove_claims_where(|c| c.board_id == input.board_id && c.cell() == input.cell);
        Ok(Some(tile))
    }

    async fn delete_tiles(&self, board_id: DbId) -> StoreResult<u64> {
        Ok(self.state.write().await.remove_tiles_of(board_id))
    }

    async fn purge_expired_claims(&self, board_id: DbId, now: Timestamp) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        Ok(state.remove_claims_where(|c| c.board_id == board_id && !c.is_live(now)))
    }

    async fn list_live_claims(
        &self,
        board_id: DbId,
        now: Timestamp,
    ) -> StoreResult<Vec<TileClaim>> {
        let state = self.state.read().await;
        Ok(state
            .claims
            .values()
            .filter(|c| c.board_id == board_id && c.is_live(now))
            .cloned()
            .collect())
    }

    async fn insert_claim_if_free(
        &self,
        input: &CreateClaim,
        now: Timestamp,
    ) -> StoreResult<ClaimInsert> {
        let mut state = self.state.write().await;
        let key = (input.board_id, input.cell);

        if state.tile_cells.contains_key(&key) {
            return Ok(ClaimInsert::CellFilled);
        }

        if let Some(existing_id) = state.claim_cells.get(&key).copied() {
            match state.claims.get(&existing_id) {
                Some(existing) if existing.is_live(now) => {
                    return Ok(ClaimInsert::CellLocked {
                        expires_at: Some(existing.expires_at),
                    });
                }
                _ => {
                    state.remove_claim(existing_id);
                }
            }
        }

        let claim = TileClaim {
            id: state.allocate_id(),
            board_id: input.board_id,
            x: input.cell.x,
            y: input.cell.y,
            side: input.side.as_str().to_string(),
            from_tile_id: input.from_tile_id,
            user_id: input.user_id.clone(),
            created_at: now,
            expires_at: input.expires_at,
        };
        state.claim_cells.insert(key, claim.id);
        state.claims.insert(claim.id, claim.clone());
        Ok(ClaimInsert::Inserted(claim))
    }

    async fn renew_claim(
        &self,
        claim_id: DbId,
        user_id: &str,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> StoreResult<Option<TileClaim>> {
        let mut state = self.state.write().await;
        match state.claims.get_mut(&claim_id) {
            Some(claim) if claim.user_id == user_id && claim.is_live(now) => {
                claim.expires_at = expires_at;
                Ok(Some(claim.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_claim(&self, claim_id: DbId, user_id: &str) -> StoreResult<Option<TileClaim>> {
        let mut state = self.state.write().await;
        let owned = state
            .claims
            .get(&claim_id)
            .is_some_and(|c| c.user_id == user_id);
        if !owned {
            return Ok(None);
        }
        Ok(state.remove_claim(claim_id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
