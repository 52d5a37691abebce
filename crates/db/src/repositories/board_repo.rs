//! Repository for the `boards` table.

use quilt_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::board::{Board, CreateBoard};

/// Column list for `boards` queries.
const COLUMNS: &str = "id, name, size, published, created_by, created_at";

/// Provides CRUD operations for boards.
pub struct BoardRepo;

impl BoardRepo {
    /// Insert a new, published board.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBoard,
        now: Timestamp,
    ) -> Result<Board, sqlx::Error> {
        let query = format!(
            "INSERT INTO boards (name, size, published, created_by, created_at) \
             VALUES ($1, $2, true, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Board>(&query)
            .bind(&input.name)
            .bind(input.size)
            .bind(&input.created_by)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Board>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boards WHERE id = $1");
        sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Published boards, newest first.
    pub async fn list_published(pool: &PgPool) -> Result<Vec<Board>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM boards WHERE published = true \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Board>(&query).fetch_all(pool).await
    }

    /// All boards created by `owner`, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner: &str) -> Result<Vec<Board>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM boards WHERE created_by = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Board>(&query)
            .bind(owner)
            .fetch_all(pool)
            .await
    }

    /// Returns `true` if a board owned by `owner` was updated.
    pub async fn set_published(
        pool: &PgPool,
        id: DbId,
        owner: &str,
        published: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE boards SET published = $3 WHERE id = $1 AND created_by = $2",
        )
        .bind(id)
        .bind(owner)
        .bind(published)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a board owned by `owner`; tiles and claims cascade.
    pub async fn delete(pool: &PgPool, id: DbId, owner: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
