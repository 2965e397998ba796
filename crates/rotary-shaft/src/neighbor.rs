//! Ephemeral adjacency records produced by spatial neighbor resolution.

use crate::network::ShaftPart;
use rotary_core::geom::Direction;
use rotary_core::id::NetworkId;

/// One adjacency discovered by spatial lookup: this element's part on the
/// probing side, the reciprocal part of the adjacent element, and the
/// network each side was bound to at resolution time.
///
/// Never stored; recomputed on demand. The recorded network bindings go
/// stale as soon as a merge runs, so consumers re-read bindings before
/// acting on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaftNeighbor {
    pub this_part: ShaftPart,
    pub this_network: Option<NetworkId>,
    pub side: Direction,
    pub other_part: ShaftPart,
    pub other_network: Option<NetworkId>,
}
