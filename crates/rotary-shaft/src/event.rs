//! Events emitted by shaft operations.
//!
//! The engine never calls back into the host; every externally visible side
//! effect of connect/disconnect/merge/rebuild is returned as an event list
//! for the host to act on after the operation completed. By the time an
//! event is delivered, all membership sets are fully updated.

use rotary_core::geom::{Direction, GridPosition};
use rotary_core::id::{ElementId, NetworkId};

/// A side effect of a shaft operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaftEvent {
    /// The network's speed drifted past the hysteresis band; the element
    /// should republish its state.
    NeedPublish {
        element: ElementId,
        network: NetworkId,
    },
    /// The element gained a mechanical connection on `side`.
    Connected {
        element: ElementId,
        side: Direction,
        network: NetworkId,
    },
    /// The element lost a mechanical connection on `side`. The network is
    /// the one it was connected through, if still known.
    Disconnected {
        element: ElementId,
        side: Direction,
        network: Option<NetworkId>,
    },
    /// A merge brought together networks with an incompatible speed
    /// mismatch. The host should schedule a destructive failure at
    /// `position` with near-immediate delay; the merge itself completed
    /// normally.
    ExplosionScheduled {
        element: ElementId,
        position: GridPosition,
        delta_rads: f64,
    },
}
