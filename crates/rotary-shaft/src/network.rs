//! The network value type: membership set, derived caches, and the
//! speed/energy state machine.

use rotary_core::config::ShaftConfig;
use rotary_core::geom::Direction;
use rotary_core::id::{ElementId, NetworkId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// One terminal of a network's membership set: an element seen through one
/// of its connectivity sides. Identity is by value; a network holds each
/// `(element, side)` pair at most once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ShaftPart {
    pub element: ElementId,
    pub side: Direction,
}

impl ShaftPart {
    pub fn new(element: ElementId, side: Direction) -> Self {
        Self { element, side }
    }
}

// ---------------------------------------------------------------------------
// Network kind
// ---------------------------------------------------------------------------

/// Regular networks carry whatever speed the physics gives them. Fixed
/// networks model an externally imposed speed (a generator or fixed drive):
/// the speed never moves, the mass is effectively infinite, and they always
/// win merge precedence over regular networks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NetworkKind {
    Regular,
    Fixed { rads: f64 },
}

// ---------------------------------------------------------------------------
// ShaftNetwork
// ---------------------------------------------------------------------------

/// A maximal set of mechanically coupled parts sharing one rotational speed.
///
/// `elements` and `mass` are caches derived from `parts`; the module refreshes
/// them after every membership change. Speed is clamped on every write:
/// negative or non-finite values become 0, so repeated float accumulation
/// from merges and splits can never propagate NaN into the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaftNetwork {
    id: NetworkId,
    pub(crate) parts: BTreeSet<ShaftPart>,
    pub(crate) elements: BTreeSet<ElementId>,
    pub(crate) mass: f64,
    pub(crate) rads: f64,
    pub(crate) rads_last_published: f64,
    pub(crate) kind: NetworkKind,
}

/// Map a speed write to the value actually stored: finite and non-negative,
/// everything else collapses to 0.
pub(crate) fn clamp_rads(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

impl ShaftNetwork {
    pub(crate) fn new(id: NetworkId, kind: NetworkKind) -> Self {
        let kind = match kind {
            NetworkKind::Regular => NetworkKind::Regular,
            NetworkKind::Fixed { rads } => NetworkKind::Fixed {
                rads: clamp_rads(rads),
            },
        };
        let marker = match kind {
            NetworkKind::Fixed { rads } => rads,
            NetworkKind::Regular => 0.0,
        };
        Self {
            id,
            parts: BTreeSet::new(),
            elements: BTreeSet::new(),
            mass: 0.0,
            rads: 0.0,
            rads_last_published: marker,
            kind,
        }
    }

    pub fn id(&self) -> NetworkId {
        self.id
    }

    pub fn parts(&self) -> &BTreeSet<ShaftPart> {
        &self.parts
    }

    pub fn elements(&self) -> &BTreeSet<ElementId> {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.kind, NetworkKind::Fixed { .. })
    }

    /// Aggregate mass. Fixed networks report the configured static mass
    /// regardless of membership.
    pub fn mass(&self, config: &ShaftConfig) -> f64 {
        match self.kind {
            NetworkKind::Fixed { .. } => config.static_mass,
            NetworkKind::Regular => {
                if self.mass.is_finite() {
                    self.mass
                } else {
                    0.0
                }
            }
        }
    }

    /// Current rotational speed, always finite and non-negative.
    pub fn rads(&self) -> f64 {
        match self.kind {
            NetworkKind::Fixed { rads } => rads,
            NetworkKind::Regular => self.rads,
        }
    }

    /// Write the speed, clamped. Returns whether the write drifted past the
    /// hysteresis band and the publish marker was advanced. No-op on fixed
    /// networks.
    pub(crate) fn set_rads(&mut self, v: f64, hysteresis: f64) -> bool {
        if self.is_fixed() {
            return false;
        }
        self.rads = clamp_rads(v);
        self.publish_check(hysteresis)
    }

    /// Compare the publish marker against the current speed; when it has
    /// drifted outside `rads * (1 ± hysteresis)` the marker advances and the
    /// caller owes the elements a publish.
    pub(crate) fn publish_check(&mut self, hysteresis: f64) -> bool {
        let rads = self.rads();
        if self.rads_last_published > rads * (1.0 + hysteresis)
            || self.rads_last_published < rads * (1.0 - hysteresis)
        {
            self.rads_last_published = rads;
            true
        } else {
            false
        }
    }

    /// Kinetic energy of the network.
    pub fn energy(&self, config: &ShaftConfig) -> f64 {
        let r = self.rads();
        0.5 * self.mass(config) * r * r * config.energy_factor
    }

    /// Write the energy by inverting the kinetic-energy relation. Negative
    /// or non-finite energy stops the network. Returns the publish-crossing
    /// flag from the underlying speed write.
    pub(crate) fn set_energy(&mut self, value: f64, config: &ShaftConfig) -> bool {
        if value < 0.0 || !value.is_finite() {
            return self.set_rads(0.0, config.publish_hysteresis);
        }
        let r = (2.0 * value / (self.mass(config) * config.energy_factor)).sqrt();
        self.set_rads(r, config.publish_hysteresis)
    }

    /// Seed speed and publish marker without triggering a publish; used when
    /// a fresh network inherits state from the one it replaces.
    pub(crate) fn prime(&mut self, rads: f64, marker: f64) {
        self.rads = clamp_rads(rads);
        self.rads_last_published = marker;
    }

    /// Turn this network into a fixed-speed one.
    pub(crate) fn make_fixed(&mut self, rads: f64) {
        self.kind = NetworkKind::Fixed {
            rads: clamp_rads(rads),
        };
    }

    /// Fixed networks take any merge; a merge between two fixed networks has
    /// no preferred survivor.
    pub fn has_merge_precedence_over(&self, other: &ShaftNetwork) -> bool {
        self.is_fixed() && !other.is_fixed()
    }
}

/// Would merging these two networks trip the destructive failure? The
/// allowed speed mismatch shrinks linearly as the faster network speeds up.
pub fn would_explode(a: &ShaftNetwork, b: &ShaftNetwork, config: &ShaftConfig) -> bool {
    let (ra, rb) = (a.rads(), b.rads());
    (ra - rb).abs() > config.merge_tolerance(ra.max(rb))
}
