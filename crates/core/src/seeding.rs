//! Overlap-strip geometry for seeding a new tile from its filled neighbors.
//!
//! Every tile is drawn on a fixed `TILE_WIDTH` x `TILE_HEIGHT` canvas. A new
//! tile is seeded with a strip 10% wide (or tall) copied from each filled
//! orthogonal neighbor, taken from the neighbor's edge that touches the new
//! cell and placed on the matching edge of the new canvas.

use serde::{Deserialize, Serialize};

use crate::grid::Cell;

/// Canvas width of a single tile, in pixels.
pub const TILE_WIDTH: u32 = 560;

/// Canvas height of a single tile, in pixels.
pub const TILE_HEIGHT: u32 = 360;

/// Fraction of a tile's width/height shared with a neighbor.
pub const OVERLAP_RATIO: f64 = 0.1;

/// Width of a vertical overlap strip (56 px).
pub fn overlap_width() -> u32 {
    (f64::from(TILE_WIDTH) * OVERLAP_RATIO).round() as u32
}

/// Height of a horizontal overlap strip (36 px).
pub fn overlap_height() -> u32 {
    (f64::from(TILE_HEIGHT) * OVERLAP_RATIO).round() as u32
}

/// An axis-aligned rectangle in tile pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Which side of the target cell a neighbor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl NeighborSide {
    pub const ALL: [NeighborSide; 4] = [
        NeighborSide::Left,
        NeighborSide::Right,
        NeighborSide::Top,
        NeighborSide::Bottom,
    ];

    /// The neighbor's coordinate relative to `target`.
    pub fn neighbor_of(self, target: Cell) -> Cell {
        match self {
            NeighborSide::Left => Cell::new(target.x - 1, target.y),
            NeighborSide::Right => Cell::new(target.x + 1, target.y),
            NeighborSide::Top => Cell::new(target.x, target.y - 1),
            NeighborSide::Bottom => Cell::new(target.x, target.y + 1),
        }
    }

    /// The strip to crop out of the neighbor's image: its edge facing the target.
    pub fn source_rect(self) -> PixelRect {
        let (w, h) = (overlap_width(), overlap_height());
        match self {
            NeighborSide::Left => PixelRect {
                x: TILE_WIDTH - w,
                y: 0,
                width: w,
                height: TILE_HEIGHT,
            },
            NeighborSide::Right => PixelRect {
                x: 0,
                y: 0,
                width: w,
                height: TILE_HEIGHT,
            },
            NeighborSide::Top => PixelRect {
                x: 0,
                y: TILE_HEIGHT - h,
                width: TILE_WIDTH,
                height: h,
            },
            NeighborSide::Bottom => PixelRect {
                x: 0,
                y: 0,
                width: TILE_WIDTH,
                height: h,
            },
        }
    }

    /// Where the strip lands on the new canvas: the edge facing the neighbor.
    pub fn dest_rect(self) -> PixelRect {
        let (w, h) = (overlap_width(), overlap_height());
        match self {
            NeighborSide::Left => PixelRect {
                x: 0,
                y: 0,
                width: w,
                height: TILE_HEIGHT,
            },
            NeighborSide::Right => PixelRect {
                x: TILE_WIDTH - w,
                y: 0,
                width: w,
                height: TILE_HEIGHT,
            },
            NeighborSide::Top => PixelRect {
                x: 0,
                y: 0,
                width: TILE_WIDTH,
                height: h,
            },
            NeighborSide::Bottom => PixelRect {
                x: 0,
                y: TILE_HEIGHT - h,
                width: TILE_WIDTH,
                height: h,
            },
        }
    }
}

/// One neighbor lookup to perform for a target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripPlan {
    pub side: NeighborSide,
    pub neighbor: Cell,
    pub source: PixelRect,
    pub dest: PixelRect,
}

/// Plan the strips for `target`, skipping neighbors that fall off the board.
pub fn strip_plans(target: Cell, size: i32) -> Vec<StripPlan> {
    NeighborSide::ALL
        .into_iter()
        .filter_map(|side| {
            let neighbor = side.neighbor_of(target);
            neighbor.in_bounds(size).then(|| StripPlan {
                side,
                neighbor,
                source: side.source_rect(),
                dest: side.dest_rect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_ten_percent() {
        assert_eq!(overlap_width(), 56);
        assert_eq!(overlap_height(), 36);
    }

    #[test]
    fn left_neighbor_gives_its_right_edge() {
        let src = NeighborSide::Left.source_rect();
        assert_eq!((src.x, src.width, src.height), (504, 56, 360));
        let dst = NeighborSide::Left.dest_rect();
        assert_eq!((dst.x, dst.y), (0, 0));
    }

    #[test]
    fn top_neighbor_gives_its_bottom_edge() {
        let src = NeighborSide::Top.source_rect();
        assert_eq!((src.y, src.width, src.height), (324, 560, 36));
        assert_eq!(NeighborSide::Top.dest_rect().y, 0);
    }

    #[test]
    fn right_and_bottom_land_on_far_edges() {
        assert_eq!(NeighborSide::Right.dest_rect().x, 504);
        assert_eq!(NeighborSide::Bottom.dest_rect().y, 324);
    }

    #[test]
    fn corner_cell_has_two_neighbors() {
        let plans = strip_plans(Cell::new(0, 0), 3);
        let sides: Vec<NeighborSide> = plans.iter().map(|p| p.side).collect();
        assert_eq!(sides, vec![NeighborSide::Right, NeighborSide::Bottom]);
    }

    #[test]
    fn center_cell_has_four_neighbors() {
        let plans = strip_plans(Cell::new(1, 1), 3);
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[0].neighbor, Cell::new(0, 1));
        assert_eq!(plans[2].neighbor, Cell::new(1, 0));
    }
}
