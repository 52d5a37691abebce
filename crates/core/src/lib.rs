//! Domain logic for the collaborative tile board.
//!
//! Pure, I/O-free building blocks shared by the stores, the claim protocol
//! services and the HTTP layer.

pub mod claims;
pub mod clock;
pub mod composition;
pub mod error;
pub mod grid;
pub mod seeding;
pub mod settings;
pub mod types;
