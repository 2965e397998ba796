//! Saved shaft state: per-element network speeds, binary-encoded.
//!
//! Topology is never persisted; it is reconstructed from live spatial
//! adjacency at load time (with [`MergeMode::Reload`](crate::module::MergeMode)
//! suppressing energy accounting). The only state worth saving is each
//! element's view of the speed of the network on each of its sides, read
//! back clamped.

use crate::module::{ShaftError, ShaftModule};
use rotary_core::geom::Direction;
use rotary_core::id::ElementId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying saved shaft state.
pub const SHAFT_STATE_MAGIC: u32 = 0x5254_0001;

/// Current format version. Increment when breaking the wire format.
pub const SHAFT_STATE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from encoding or decoding saved shaft state.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SHAFT_STATE_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", SHAFT_STATE_VERSION, .0)]
    UnsupportedVersion(u32),
}

// ---------------------------------------------------------------------------
// Saved state
// ---------------------------------------------------------------------------

/// One element's persisted shaft state: the speed of the network bound to
/// each of its connectivity sides at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedElementShafts {
    magic: u32,
    version: u32,
    pub speeds: Vec<(Direction, f64)>,
}

impl SavedElementShafts {
    pub fn new(speeds: Vec<(Direction, f64)>) -> Self {
        Self {
            magic: SHAFT_STATE_MAGIC,
            version: SHAFT_STATE_VERSION,
            speeds,
        }
    }

    /// Validate the header fields. Returns `Ok(())` if valid.
    pub fn validate(&self) -> Result<(), PersistError> {
        if self.magic != SHAFT_STATE_MAGIC {
            return Err(PersistError::InvalidMagic(self.magic));
        }
        if self.version != SHAFT_STATE_VERSION {
            return Err(PersistError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// Encode to bytes.
    pub fn encode(&self) -> Result<Vec<u8>, PersistError> {
        bitcode::serialize(self).map_err(|e| PersistError::Encode(e.to_string()))
    }

    /// Decode from bytes and validate the header.
    pub fn decode(data: &[u8]) -> Result<Self, PersistError> {
        let saved: SavedElementShafts =
            bitcode::deserialize(data).map_err(|e| PersistError::Decode(e.to_string()))?;
        saved.validate()?;
        Ok(saved)
    }
}

impl ShaftModule {
    /// Capture the saved state of one element: the current speed of the
    /// network on each bound side.
    pub fn save_element(&self, element: ElementId) -> Result<SavedElementShafts, ShaftError> {
        let spec = self
            .element_spec(element)
            .ok_or(ShaftError::ElementNotFound(element))?;
        let sides = spec.connectivity.clone();
        let mut speeds = Vec::with_capacity(sides.len());
        for side in sides {
            if let Some(net) = self.network_of(element, side)? {
                if let Some(network) = self.network(net) {
                    speeds.push((side, network.rads()));
                }
            }
        }
        Ok(SavedElementShafts::new(speeds))
    }

    /// Restore saved speeds onto the element's current networks. Values go
    /// through the normal clamping setter, so negative or non-finite saves
    /// come back as 0. Returns any publish events the writes produced.
    pub fn load_element(
        &mut self,
        element: ElementId,
        saved: &SavedElementShafts,
    ) -> Result<Vec<crate::event::ShaftEvent>, ShaftError> {
        let mut events = Vec::new();
        for &(side, rads) in &saved.speeds {
            let Some(net) = self.network_of(element, side)? else {
                continue;
            };
            events.extend(self.set_rads(net, rads)?);
        }
        Ok(events)
    }
}
