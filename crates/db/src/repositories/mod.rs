//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or a transaction connection) as the first argument.

pub mod board_repo;
pub mod claim_repo;
pub mod tile_repo;

pub use board_repo::BoardRepo;
pub use claim_repo::ClaimRepo;
pub use tile_repo::TileRepo;
