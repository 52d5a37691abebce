//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO consumed by the stores

pub mod board;
pub mod claim;
pub mod tile;
