//! Repository for the `tile_claims` table.
//!
//! Mirrors the entity-lock pattern: acquisition is an
//! `INSERT ... ON CONFLICT DO NOTHING` against the per-cell unique constraint,
//! and every ownership-sensitive update filters on `user_id` in the same
//! statement.

use quilt_core::grid::Cell;
use quilt_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::claim::{CreateClaim, TileClaim};

/// Column list for `tile_claims` queries.
const COLUMNS: &str = "id, board_id, x, y, side, from_tile_id, user_id, created_at, expires_at";

/// Provides conditional operations for tile claims.
pub struct ClaimRepo;

impl ClaimRepo {
    /// Attempt to insert a claim.
    ///
    /// Returns `None` when another claim row already occupies the cell. The
    /// caller must purge expired rows for the cell first (in the same
    /// transaction) so that a conflict always means a live holder.
    pub async fn try_insert<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateClaim,
        now: Timestamp,
    ) -> Result<Option<TileClaim>, sqlx::Error> {
        let query = format!(
            "INSERT INTO tile_claims (board_id, x, y, side, from_tile_id, user_id, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT uq_tile_claims_board_cell DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TileClaim>(&query)
            .bind(input.board_id)
            .bind(input.cell.x)
            .bind(input.cell.y)
            .bind(input.side.as_str())
            .bind(input.from_tile_id)
            .bind(&input.user_id)
            .bind(now)
            .bind(input.expires_at)
            .fetch_optional(executor)
            .await
    }

    /// The claim row currently occupying a cell, live or not.
    pub async fn find_at<'e>(
        executor: impl PgExecutor<'e>,
        board_id: DbId,
        cell: Cell,
    ) -> Result<Option<TileClaim>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tile_claims WHERE board_id = $1 AND x = $2 AND y = $3"
        );
        sqlx::query_as::<_, TileClaim>(&query)
            .bind(board_id)
            .bind(cell.x)
            .bind(cell.y)
            .fetch_optional(executor)
            .await
    }

    /// Extend a live claim held by `user_id`.
    ///
    /// Returns `None` when the claim does not exist, belongs to someone else,
    /// or has already expired.
    pub async fn extend(
        pool: &PgPool,
        claim_id: DbId,
        user_id: &str,
        now: Timestamp,
        expires_at: Timestamp,
    ) -> Result<Option<TileClaim>, sqlx::Error> {
        let query = format!(
            "UPDATE tile_claims SET expires_at = $4 \
             WHERE id = $1 AND user_id = $2 AND expires_at > $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TileClaim>(&query)
            .bind(claim_id)
            .bind(user_id)
            .bind(now)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Delete a claim held by `user_id`, returning the removed row.
    pub async fn delete_owned(
        pool: &PgPool,
        claim_id: DbId,
        user_id: &str,
    ) -> Result<Option<TileClaim>, sqlx::Error> {
        let query = format!(
            "DELETE FROM tile_claims WHERE id = $1 AND user_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TileClaim>(&query)
            .bind(claim_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete every claim row at a cell regardless of owner.
    pub async fn delete_at<'e>(
        executor: impl PgExecutor<'e>,
        board_id: DbId,
        cell: Cell,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tile_claims WHERE board_id = $1 AND x = $2 AND y = $3")
            .bind(board_id)
            .bind(cell.x)
            .bind(cell.y)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete an expired claim row at one cell.
    pub async fn delete_expired_at<'e>(
        executor: impl PgExecutor<'e>,
        board_id: DbId,
        cell: Cell,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM tile_claims \
             WHERE board_id = $1 AND x = $2 AND y = $3 AND expires_at <= $4",
        )
        .bind(board_id)
        .bind(cell.x)
        .bind(cell.y)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete every expired claim on a board. Returns the number removed.
    pub async fn purge_expired(
        pool: &PgPool,
        board_id: DbId,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tile_claims WHERE board_id = $1 AND expires_at <= $2")
            .bind(board_id)
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Live claims on a board.
    pub async fn list_live(
        pool: &PgPool,
        board_id: DbId,
        now: Timestamp,
    ) -> Result<Vec<TileClaim>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tile_claims WHERE board_id = $1 AND expires_at > $2 \
             ORDER BY y, x"
        );
        sqlx::query_as::<_, TileClaim>(&query)
            .bind(board_id)
            .bind(now)
            .fetch_all(pool)
            .await
    }
}
