//! Element registration: the capability set a host declares per element,
//! and the per-side network bindings the module maintains for it.

use crate::coupling::InternalCoupling;
use rotary_core::geom::{Direction, GridPosition, DIRECTION_COUNT};
use rotary_core::id::NetworkId;
use serde::{Deserialize, Serialize};

/// Everything the engine needs to know about one shaft element. Registered
/// once via `ShaftModule::add_element`; the element itself stays host-owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaftElementSpec {
    /// Mass contribution to any network the element belongs to.
    pub mass: f64,
    /// Sides through which the element can mechanically couple.
    pub connectivity: Vec<Direction>,
    /// Block position, used for neighbor resolution and failure scoping.
    pub position: GridPosition,
    /// Which of the element's own sides share rotation.
    pub coupling: InternalCoupling,
    /// An externally imposed speed. `Some` makes every network this element
    /// anchors a fixed-speed network.
    pub fixed_speed: Option<f64>,
}

impl ShaftElementSpec {
    /// A fully coupled, free-spinning element.
    pub fn new(mass: f64, connectivity: Vec<Direction>, position: GridPosition) -> Self {
        Self {
            mass,
            connectivity,
            position,
            coupling: InternalCoupling::Full,
            fixed_speed: None,
        }
    }

    pub fn with_coupling(mut self, coupling: InternalCoupling) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn with_fixed_speed(mut self, rads: f64) -> Self {
        self.fixed_speed = Some(rads);
        self
    }
}

/// Module-internal record: the spec plus the mutable per-side network
/// bindings and the destruction flag.
#[derive(Debug, Clone)]
pub(crate) struct ElementState {
    pub(crate) spec: ShaftElementSpec,
    shafts: [Option<NetworkId>; DIRECTION_COUNT],
    pub(crate) destroying: bool,
}

impl ElementState {
    pub(crate) fn new(spec: ShaftElementSpec) -> Self {
        Self {
            spec,
            shafts: [None; DIRECTION_COUNT],
            destroying: false,
        }
    }

    pub(crate) fn shaft(&self, side: Direction) -> Option<NetworkId> {
        self.shafts[side.index()]
    }

    pub(crate) fn set_shaft(&mut self, side: Direction, net: Option<NetworkId>) {
        self.shafts[side.index()] = net;
    }
}
