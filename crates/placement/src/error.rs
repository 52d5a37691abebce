use quilt_core::error::CoreError;
use quilt_core::grid::Cell;
use quilt_core::types::{DbId, Timestamp};
use quilt_db::StoreError;

/// Coarse classification of a protocol failure.
///
/// None of these are retryable in place: every rejection means the caller's
/// view of the board is stale and must be refreshed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input.
    Validation,
    /// The cell is filled, locked, or the claim no longer fits the request.
    Conflict,
    /// Unknown board, tile or claim.
    NotFound,
    /// Store failure.
    Internal,
}

/// Rejection from one of the protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("Board not found")]
    BoardNotFound(DbId),

    #[error("Source tile not found")]
    SourceTileNotFound(DbId),

    #[error("Invalid side '{0}'. Must be one of: right, bottom")]
    InvalidSide(String),

    #[error("Target {0} is outside the board")]
    OutOfBounds(Cell),

    #[error("Tile already exists at {0}")]
    TileExists(Cell),

    #[error("Tile at {cell} is locked")]
    TileLocked {
        cell: Cell,
        expires_at: Option<Timestamp>,
    },

    #[error("Lock not found")]
    ClaimNotFound,

    #[error("Lock required")]
    ClaimRequired,

    #[error("Lock target mismatch")]
    ClaimMismatch,

    #[error("Lock expired")]
    ClaimExpired,

    #[error("First tile must be at (0, 0)")]
    FirstTileMustBeOrigin,

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PlacementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlacementError::InvalidSide(_)
            | PlacementError::OutOfBounds(_)
            | PlacementError::ClaimRequired
            | PlacementError::FirstTileMustBeOrigin
            | PlacementError::InvalidInput(_) => ErrorKind::Validation,
            PlacementError::TileExists(_)
            | PlacementError::TileLocked { .. }
            | PlacementError::ClaimMismatch
            | PlacementError::ClaimExpired => ErrorKind::Conflict,
            PlacementError::BoardNotFound(_)
            | PlacementError::SourceTileNotFound(_)
            | PlacementError::ClaimNotFound => ErrorKind::NotFound,
            PlacementError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            PlacementError::BoardNotFound(_) => "BOARD_NOT_FOUND",
            PlacementError::SourceTileNotFound(_) => "SOURCE_TILE_NOT_FOUND",
            PlacementError::InvalidSide(_) => "INVALID_SIDE",
            PlacementError::OutOfBounds(_) => "OUT_OF_BOUNDS",
            PlacementError::TileExists(_) => "TILE_EXISTS",
            PlacementError::TileLocked { .. } => "TILE_LOCKED",
            PlacementError::ClaimNotFound => "CLAIM_NOT_FOUND",
            PlacementError::ClaimRequired => "CLAIM_REQUIRED",
            PlacementError::ClaimMismatch => "CLAIM_MISMATCH",
            PlacementError::ClaimExpired => "CLAIM_EXPIRED",
            PlacementError::FirstTileMustBeOrigin => "FIRST_TILE_MUST_BE_ORIGIN",
            PlacementError::InvalidInput(_) => "VALIDATION_ERROR",
            PlacementError::Store(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<CoreError> for PlacementError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => PlacementError::InvalidInput(msg),
            other => PlacementError::InvalidInput(other.to_string()),
        }
    }
}

pub type PlacementResult<T> = Result<T, PlacementError>;
