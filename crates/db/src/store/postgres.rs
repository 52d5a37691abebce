//! PostgreSQL-backed [`TileStore`].
//!
//! Single-statement operations go straight to the repositories. The claim
//! insert (clear an expired holder, check the tile, insert) and the tile insert
//! (insert, clear claims at the cell) each run in one transaction that first
//! takes a transaction-scoped advisory lock on the cell. Under READ COMMITTED
//! the tile check cannot see an uncommitted tile, so without the shared lock a
//! claim could land right after a tile filled its cell.

use async_trait::async_trait;
use quilt_core::grid::Cell;
use quilt_core::types::{DbId, Timestamp};
use sqlx::PgConnection;

use super::{StoreResult, TileStore};
use crate::models::board::{Board, CreateBoard};
use crate::models::claim::{ClaimInsert, CreateClaim, TileClaim};
use crate::models::tile::{CreateTile, Tile};
use crate::repositories::{BoardRepo, ClaimRepo, TileRepo};
use crate::DbPool;

/// A [`TileStore`] over a Postgres connection pool.
#[derive(Clone)]
pub struct PgTileStore {
    pool: DbPool,
}

impl PgTileStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Block until this transaction holds the advisory lock for `(board_id, cell)`.
///
/// Released at commit or rollback. Distinct cells hashing to the same key
/// only serialize with each other.
async fn lock_cell(
    conn: &mut PgConnection,
    board_id: DbId,
    cell: Cell,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "SELECT pg_advisory_xact_lock( \
             hashtextextended(format('%s:%s:%s', $1::BIGINT, $2::INT, $3::INT), 0))",
    )
    .bind(board_id)
    .bind(cell.x)
    .bind(cell.y)
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl TileStore for PgTileStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_board(&self, input: &CreateBoard, now: Timestamp) -> StoreResult<Board> {
        Ok(BoardRepo::create(&self.pool, input, now).await?)
    }

    async fn find_board(&self, board_id: DbId) -> StoreResult<Option<Board>> {
        Ok(BoardRepo::find_by_id(&self.pool, board_id).await?)
    }

    async fn list_published_boards(&self) -> StoreResult<Vec<Board>> {
        Ok(BoardRepo::list_published(&self.pool).await?)
    }

    async fn list_boards_by_owner(&self, owner: &str) -> StoreResult<Vec<Board>> {
        Ok(BoardRepo::list_by_owner(&self.pool, owner).await?)
    }

    async fn set_board_published(
        &self,
        board_id: DbId,
        owner: &str,
        published: bool,
    ) -> StoreResult<bool> {
        Ok(BoardRepo::set_published(&self.pool, board_id, owner, published).await?)
    }

    async fn delete_board(&self, board_id: DbId, owner: &str) -> StoreResult<bool> {
        Ok(BoardRepo::delete(&self.pool, board_id, owner).await?)
    }

    async fn find_tile(&self, tile_id: DbId) -> StoreResult<Option<Tile>> {
        Ok(TileRepo::find_by_id(&self.pool, tile_id).await?)
    }

    async fn tile_at(&self, board_id: DbId, cell: Cell) -> StoreResult<Option<Tile>> {
        Ok(TileRepo::find_at(&self.pool, board_id, cell).await?)
    }

    async fn count_tiles(&self, board_id: DbId) -> StoreResult<i64> {
        Ok(TileRepo::count_for_board(&self.pool, board_id).await?)
    }

    async fn list_tiles(&self, board_id: DbId) -> StoreResult<Vec<Tile>> {
        Ok(TileRepo::list_for_board(&self.pool, board_id).await?)
    }

    async fn insert_tile_if_empty(
        &self,
        input: &CreateTile,
        now: Timestamp,
    ) -> StoreResult<Option<Tile>> {
        let mut tx = self.pool.begin().await?;
        lock_cell(&mut *tx, input.board_id, input.cell).await?;

        let tile = TileRepo::insert_if_empty(&mut *tx, input, now).await?;
        if tile.is_some() {
            ClaimRepo::delete_at(&mut *tx, input.board_id, input.cell).await?;
        }
        tx.commit().await?;
        Ok(tile)
    }

    async fn delete_tiles(&self, board_id: DbId) -> StoreResult<u64> {
        Ok(TileRepo::delete_for_board(&self.pool, board_id).await?)
    }

    async fn purge_expired_claims(&self, board_id: DbId, now: Timestamp) -> StoreResult<u64> {
        Ok(ClaimRepo::purge_expired(&self.pool, board_id, now).await?)
    }

    async fn list_live_claims(
        &self,
        board_id: DbId,
        now: Timestamp,
    ) -> StoreResult<Vec<TileClaim>> {
        Ok(ClaimRepo::list_live(&self.pool, board_id, now).await?)
    }

    async fn insert_claim_if_free(
        &self,
        input: &CreateClaim,
        now: Timestamp,
    ) -> StoreResult<ClaimInsert> {
        let mut tx = self.pool.begin().await?;
        lock_cell(&mut *tx, input.board_id, input.cell).await?;

        ClaimRepo::delete_expired_at(&mut *tx, input.board_id, input.cell, now).await?;

        if TileRepo::exists_at(&mut *tx, input.board_id, input.cell).await? {
            tx.commit().await?;
            return Ok(ClaimInsert::CellFilled);
        }

        let outcome = match ClaimRepo::try_insert(&mut *tx, input, now).await? {
            Some(claim) => ClaimInsert::Inserted(claim),
            None => {
                let holder = ClaimRepo::find_at(&mut *tx, input.board_id, input.cell).await?;
                tracing::debug!(
                    board_id = input.board_id,
                    cell = %input.cell,
                    holder_visible = holder.is_some(),
                    "Claim insert conflicted",
                );
                ClaimInsert::CellLocked {
                    expires_at: holder.map(|c| c.expires_at),
                }
            }
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn renew_claim(
        &self,
        claim_id: DbId,
        user_id: &str,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> StoreResult<Option<TileClaim>> {
        Ok(ClaimRepo::extend(&self.pool, claim_id, user_id, now, expires_at).await?)
    }

    async fn delete_claim(&self, claim_id: DbId, user_id: &str) -> StoreResult<Option<TileClaim>> {
        Ok(ClaimRepo::delete_owned(&self.pool, claim_id, user_id).await?)
    }
}
