//! Grid geometry and open-edge computation.
//!
//! A board is an N×N grid that grows only to the right and downward from the
//! origin. From a filled cell `(x, y)` the only claimable targets are
//! `(x + 1, y)` and `(x, y + 1)`, so the filled region is always a staircase
//! reachable from `(0, 0)`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Board size
// ---------------------------------------------------------------------------

/// Side length used when a board is created without an explicit size.
pub const DEFAULT_BOARD_SIZE: i32 = 5;

/// Largest side length a board may be created with.
pub const MAX_BOARD_SIZE: i32 = 64;

/// Validate a board side length.
pub fn validate_board_size(size: i32) -> Result<(), CoreError> {
    if size < 1 {
        return Err(CoreError::Validation(format!(
            "Board size must be at least 1, got {size}"
        )));
    }
    if size > MAX_BOARD_SIZE {
        return Err(CoreError::Validation(format!(
            "Board size must be at most {MAX_BOARD_SIZE}, got {size}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A grid coordinate. `x` grows to the right, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

/// The mandatory location of a board's first tile.
pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `true` if the cell lies inside an N×N board.
    pub fn in_bounds(self, size: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < size && self.y < size
    }

    pub fn is_origin(self) -> bool {
        self == ORIGIN
    }

    fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Expansion sides
// ---------------------------------------------------------------------------

/// The two directions a filled tile can be extended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Right,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Right, Side::Bottom];

    /// Offset from the source tile to the target cell.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Side::Right => (1, 0),
            Side::Bottom => (0, 1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Right => "right",
            Side::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "right" => Ok(Side::Right),
            "bottom" => Ok(Side::Bottom),
            other => Err(CoreError::Validation(format!(
                "Invalid side '{other}'. Must be one of: right, bottom"
            ))),
        }
    }
}

/// The cell reached by extending `source` towards `side`, if it is on the board.
pub fn expansion_target(source: Cell, side: Side, size: i32) -> Option<Cell> {
    let (dx, dy) = side.delta();
    let target = source.offset(dx, dy);
    target.in_bounds(size).then_some(target)
}

// ---------------------------------------------------------------------------
// Open edges
// ---------------------------------------------------------------------------

/// A committed tile reduced to what the grid model needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTile {
    pub id: DbId,
    pub cell: Cell,
}

/// A claimable expansion: extend tile `from_tile_id` towards `side` into `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenEdge {
    pub from_tile_id: DbId,
    pub side: Side,
    pub target: Cell,
}

/// Compute every open edge of a board.
///
/// `claimed` must contain only cells held by live claims; expired claims have
/// to be dropped by the caller first. A target reachable from two tiles (for
/// example `(1, 1)` from both `(1, 0)` and `(0, 1)`) yields one edge per
/// source. The result is ordered row-major by source, right before bottom.
pub fn open_edges(
    size: i32,
    tiles: &[PlacedTile],
    claimed: impl IntoIterator<Item = Cell>,
) -> Vec<OpenEdge> {
    let filled: HashSet<Cell> = tiles.iter().map(|t| t.cell).collect();
    let claimed: HashSet<Cell> = claimed.into_iter().collect();

    let mut sources: Vec<&PlacedTile> = tiles.iter().collect();
    sources.sort_by_key(|t| (t.cell.y, t.cell.x, t.id));

    let mut edges = Vec::new();
    for tile in sources {
        for side in Side::ALL {
            let Some(target) = expansion_target(tile.cell, side, size) else {
                continue;
            };
            if filled.contains(&target) || claimed.contains(&target) {
                continue;
            }
            edges.push(OpenEdge {
                from_tile_id: tile.id,
                side,
                target,
            });
        }
    }
    edges
}

// ---------------------------------------------------------------------------
// Board phase
// ---------------------------------------------------------------------------

/// Where a board is in its lifecycle, derived from its tile count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardPhase {
    /// No tiles yet; only a claim-free commit at the origin is accepted.
    AwaitingFirstTile,
    Growing,
    Complete,
}

impl BoardPhase {
    pub fn of(size: i32, tile_count: usize) -> Self {
        let capacity = (size.max(0) as usize).pow(2);
        match tile_count {
            0 => BoardPhase::AwaitingFirstTile,
            n if n >= capacity => BoardPhase::Complete,
            _ => BoardPhase::Growing,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
