//! The tile-claim and placement protocol.
//!
//! - [`ClaimManager`]: claim, renew and release the right to fill one cell.
//! - [`PlacementCommitter`]: commit a finished tile against its claim.
//! - [`GridService`]: open edges, board snapshots, composed board image.
//! - [`SeedResolver`]: overlap strips from a cell's filled neighbors.
//! - [`BoardAdmin`]: board lifecycle for the admin surface.
//!
//! All services share one [`ProtocolContext`]. Every decision that two
//! clients can race on is delegated to a single conditional
//! [`TileStore`](quilt_db::TileStore) call, so the services hold no locks.

pub mod boards;
pub mod claims;
pub mod commit;
pub mod context;
pub mod error;
pub mod grid;
pub mod seeds;

pub use boards::{BoardAdmin, SeedOptions, SeedOutcome};
pub use claims::{ClaimGrant, ClaimManager, ClaimRequest};
pub use commit::{CommitRequest, PlacementCommitter};
pub use context::ProtocolContext;
pub use error::{ErrorKind, PlacementError, PlacementResult};
pub use grid::{BoardSnapshot, GridService};
pub use seeds::{NeighborStrip, SeedResolver};
