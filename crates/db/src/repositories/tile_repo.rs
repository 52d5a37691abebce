//! Repository for the `tiles` table.

use quilt_core::grid::Cell;
use quilt_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::tile::{CreateTile, Tile};

/// Column list for `tiles` queries.
const COLUMNS: &str = "id, board_id, x, y, image_data, created_by, created_at";

/// Provides append-only operations for committed tiles.
pub struct TileRepo;

impl TileRepo {
    /// Insert a tile unless its cell is already filled.
    ///
    /// Uses `INSERT ... ON CONFLICT DO NOTHING` against `uq_tiles_board_cell`.
    /// A conflicting insert returns `None`, so exactly one of any number of
    /// concurrent commits to the same cell gets a row back.
    pub async fn insert_if_empty<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateTile,
        now: Timestamp,
    ) -> Result<Option<Tile>, sqlx::Error> {
        let query = format!(
            "INSERT INTO tiles (board_id, x, y, image_data, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_tiles_board_cell DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tile>(&query)
            .bind(input.board_id)
            .bind(input.cell.x)
            .bind(input.cell.y)
            .bind(&input.image_data)
            .bind(&input.created_by)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tiles WHERE id = $1");
        sqlx::query_as::<_, Tile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_at(
        pool: &PgPool,
        board_id: DbId,
        cell: Cell,
    ) -> Result<Option<Tile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tiles WHERE board_id = $1 AND x = $2 AND y = $3");
        sqlx::query_as::<_, Tile>(&query)
            .bind(board_id)
            .bind(cell.x)
            .bind(cell.y)
            .fetch_optional(pool)
            .await
    }

    /// `true` if any tile occupies the cell.
    pub async fn exists_at<'e>(
        executor: impl PgExecutor<'e>,
        board_id: DbId,
        cell: Cell,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM tiles WHERE board_id = $1 AND x = $2 AND y = $3)",
        )
        .bind(board_id)
        .bind(cell.x)
        .bind(cell.y)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn count_for_board(pool: &PgPool, board_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tiles WHERE board_id = $1")
            .bind(board_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// All tiles of a board in row-major order.
    pub async fn list_for_board(pool: &PgPool, board_id: DbId) -> Result<Vec<Tile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tiles WHERE board_id = $1 ORDER BY y, x");
        sqlx::query_as::<_, Tile>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }

    /// Remove every tile of a board. Claims sourced from them cascade.
    pub async fn delete_for_board(pool: &PgPool, board_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tiles WHERE board_id = $1")
            .bind(board_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
