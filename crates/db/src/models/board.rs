//! Board model and DTOs.

use quilt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `boards` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Board {
    pub id: DbId,
    pub name: String,
    pub size: i32,
    pub published: bool,
    pub created_by: String,
    pub created_at: Timestamp,
}

/// DTO for creating a board. Name and size are already normalised.
#[derive(Debug, Clone)]
pub struct CreateBoard {
    pub name: String,
    pub size: i32,
    pub created_by: String,
}
