//! Spatial grid for shaft element placement and neighbor lookup.
//!
//! Maintains a bidirectional mapping between block positions and the
//! elements occupying them, and implements the engine's
//! [`ElementLookup`] collaborator so shaft operations can resolve
//! adjacency on demand. Shaft elements occupy exactly one block.

use rotary_core::geom::{Direction, ElementLookup, GridPosition};
use rotary_core::id::ElementId;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use std::collections::BTreeMap;

/// Errors from grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("position is occupied")]
    Occupied,
    #[error("element is not placed on the grid")]
    NotPlaced,
    #[error("element is already placed on the grid")]
    AlreadyPlaced,
}

/// A spatial index mapping block positions to shaft elements.
///
/// Maintains a bidirectional mapping:
/// - `tiles`: position -> element occupying it
/// - `positions`: element -> position
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShaftGrid {
    tiles: BTreeMap<GridPosition, ElementId>,
    positions: SecondaryMap<ElementId, GridPosition>,
}

impl ShaftGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an element on the grid.
    pub fn place(&mut self, element: ElementId, position: GridPosition) -> Result<(), GridError> {
        if self.positions.contains_key(element) {
            return Err(GridError::AlreadyPlaced);
        }
        if self.tiles.contains_key(&position) {
            return Err(GridError::Occupied);
        }
        self.tiles.insert(position, element);
        self.positions.insert(element, position);
        Ok(())
    }

    /// Remove an element from the grid. Returns the position it occupied.
    pub fn remove(&mut self, element: ElementId) -> Result<GridPosition, GridError> {
        let position = self
            .positions
            .remove(element)
            .ok_or(GridError::NotPlaced)?;
        self.tiles.remove(&position);
        Ok(position)
    }

    /// The position of a placed element.
    pub fn position(&self, element: ElementId) -> Option<GridPosition> {
        self.positions.get(element).copied()
    }

    /// Check if a position is occupied.
    pub fn is_occupied(&self, position: GridPosition) -> bool {
        self.tiles.contains_key(&position)
    }

    /// Number of placed elements.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Elements occupying the six positions adjacent to `position`.
    pub fn adjacent(&self, position: GridPosition) -> Vec<(Direction, ElementId)> {
        let mut out = Vec::new();
        for dir in Direction::all() {
            if let Some(&element) = self.tiles.get(&position.moved(dir)) {
                out.push((dir, element));
            }
        }
        out
    }
}

impl ElementLookup for ShaftGrid {
    fn element_at(&self, pos: GridPosition) -> Option<ElementId> {
        self.tiles.get(&pos).copied()
    }
}
