//! Grid geometry: positions, directions, and the neighbor-lookup trait.

use crate::id::ElementId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// The six axis directions of the block grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    XNeg,
    XPos,
    YNeg,
    YPos,
    ZNeg,
    ZPos,
}

/// Number of axis directions; sizes per-side storage.
pub const DIRECTION_COUNT: usize = 6;

impl Direction {
    /// All six axis directions.
    pub fn all() -> [Direction; DIRECTION_COUNT] {
        [
            Direction::XNeg,
            Direction::XPos,
            Direction::YNeg,
            Direction::YPos,
            Direction::ZNeg,
            Direction::ZPos,
        ]
    }

    /// The opposite direction. Two elements couple through a side pair
    /// `(d, d.inverse())`.
    pub fn inverse(self) -> Direction {
        match self {
            Direction::XNeg => Direction::XPos,
            Direction::XPos => Direction::XNeg,
            Direction::YNeg => Direction::YPos,
            Direction::YPos => Direction::YNeg,
            Direction::ZNeg => Direction::ZPos,
            Direction::ZPos => Direction::ZNeg,
        }
    }

    /// Unit offset for this direction.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::XNeg => (-1, 0, 0),
            Direction::XPos => (1, 0, 0),
            Direction::YNeg => (0, -1, 0),
            Direction::YPos => (0, 1, 0),
            Direction::ZNeg => (0, 0, -1),
            Direction::ZPos => (0, 0, 1),
        }
    }

    /// Dense index in `0..DIRECTION_COUNT` for array-backed per-side storage.
    pub fn index(self) -> usize {
        match self {
            Direction::XNeg => 0,
            Direction::XPos => 1,
            Direction::YNeg => 2,
            Direction::YPos => 3,
            Direction::ZNeg => 4,
            Direction::ZPos => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// GridPosition
// ---------------------------------------------------------------------------

/// A position on the 3D block grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The adjacent position one step in `dir`.
    pub fn moved(&self, dir: Direction) -> GridPosition {
        let (dx, dy, dz) = dir.offset();
        GridPosition::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

// ---------------------------------------------------------------------------
// Neighbor lookup
// ---------------------------------------------------------------------------

/// The world-storage collaborator: resolves a grid position to the shaft
/// element occupying it, if any. The engine never stores adjacency; it asks
/// the host on demand.
pub trait ElementLookup {
    fn element_at(&self, pos: GridPosition) -> Option<ElementId>;
}
