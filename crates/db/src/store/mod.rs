//! The authoritative store behind the claim protocol.
//!
//! Every state transition the protocol relies on is a single conditional
//! operation here (insert-if-empty, renew-if-owned-and-live,
//! delete-if-owned), so two racing requests for the same cell produce exactly
//! one winner without any application-level mutex. Implementations:
//!
//! - [`PgTileStore`] backed by PostgreSQL unique constraints and transactions.
//! - [`MemoryTileStore`] for single-process deployments and tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use quilt_core::grid::Cell;
use quilt_core::types::{DbId, Timestamp};

use crate::error::StoreError;
use crate::models::board::{Board, CreateBoard};
use crate::models::claim::{ClaimInsert, CreateClaim, TileClaim};
use crate::models::tile::{CreateTile, Tile};

pub use memory::MemoryTileStore;
pub use postgres::PgTileStore;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Atomic, conditional persistence for boards, tiles and claims.
///
/// `now` is always supplied by the caller so that expiry is judged against
/// one consistent clock.
#[async_trait]
pub trait TileStore: Send + Sync {
    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;

    /// Cheap reachability probe for health reporting.
    async fn ping(&self) -> StoreResult<()>;

    // -- Boards -------------------------------------------------------------

    async fn create_board(&self, input: &CreateBoard, now: Timestamp) -> StoreResult<Board>;

    async fn find_board(&self, board_id: DbId) -> StoreResult<Option<Board>>;

    /// Published boards, newest first.
    async fn list_published_boards(&self) -> StoreResult<Vec<Board>>;

    /// Boards created by `owner`, newest first, published or not.
    async fn list_boards_by_owner(&self, owner: &str) -> StoreResult<Vec<Board>>;

    /// Set the lifecycle flag. Returns `false` if no board with that id is owned by `owner`.
    async fn set_board_published(
        &self,
        board_id: DbId,
        owner: &str,
        published: bool,
    ) -> StoreResult<bool>;

    /// Delete a board with all its tiles and claims. Returns `false` if not owned by `owner`.
    async fn delete_board(&self, board_id: DbId, owner: &str) -> StoreResult<bool>;

    // -- Tiles --------------------------------------------------------------

    async fn find_tile(&self, tile_id: DbId) -> StoreResult<Option<Tile>>;

    async fn tile_at(&self, board_id: DbId, cell: Cell) -> StoreResult<Option<Tile>>;

    async fn count_tiles(&self, board_id: DbId) -> StoreResult<i64>;

    async fn list_tiles(&self, board_id: DbId) -> StoreResult<Vec<Tile>>;

    /// Insert a tile unless its cell is already filled. `None` means the cell was taken.
    ///
    /// On success every claim targeting the cell is removed in the same atomic
    /// step, and no concurrent [`insert_claim_if_free`](Self::insert_claim_if_free)
    /// for that cell can land after it.
    async fn insert_tile_if_empty(
        &self,
        input: &CreateTile,
        now: Timestamp,
    ) -> StoreResult<Option<Tile>>;

    /// Delete every tile of a board (and, transitively, claims sourced from them).
    async fn delete_tiles(&self, board_id: DbId) -> StoreResult<u64>;

    // -- Claims -------------------------------------------------------------

    /// Remove every claim on the board whose expiry is at or before `now`.
    async fn purge_expired_claims(&self, board_id: DbId, now: Timestamp) -> StoreResult<u64>;

    /// Claims on the board with `expires_at > now`.
    async fn list_live_claims(&self, board_id: DbId, now: Timestamp)
        -> StoreResult<Vec<TileClaim>>;

    /// Insert a claim unless the cell is filled or already held by a live claim.
    async fn insert_claim_if_free(
        &self,
        input: &CreateClaim,
        now: Timestamp,
    ) -> StoreResult<ClaimInsert>;

    /// Push the expiry of a live claim owned by `user_id` to `expires_at`.
    async fn renew_claim(
        &self,
        claim_id: DbId,
        user_id: &str,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> StoreResult<Option<TileClaim>>;

    /// Delete a claim owned by `user_id`, live or not, returning it.
    async fn delete_claim(&self, claim_id: DbId, user_id: &str) -> StoreResult<Option<TileClaim>>;
}
