//! The shaft module: arena of networks, element registry, and the
//! connect/disconnect/merge/rebuild operations that keep the partition of
//! elements into maximal connected networks correct under online edits.

use crate::coupling::coupling_groups;
use crate::element::{ElementState, ShaftElementSpec};
use crate::event::ShaftEvent;
use crate::neighbor::ShaftNeighbor;
use crate::network::{clamp_rads, would_explode, NetworkKind, ShaftNetwork, ShaftPart};
use rotary_core::config::ShaftConfig;
use rotary_core::geom::{Direction, ElementLookup};
use rotary_core::id::{ElementId, NetworkId};
use slotmap::SlotMap;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from shaft module operations.
#[derive(Debug, thiserror::Error)]
pub enum ShaftError {
    #[error("element not found: {0:?}")]
    ElementNotFound(ElementId),
    #[error("network not found: {0:?}")]
    NetworkNotFound(NetworkId),
    #[error("network has no parts left: {0:?}")]
    DeadNetwork(NetworkId),
    #[error("cannot merge a network with itself: {0:?}")]
    MergeWithSelf(NetworkId),
    #[error("part ({element:?}, {side:?}) is not a member of its assigned network")]
    NotAMember { element: ElementId, side: Direction },
}

// ---------------------------------------------------------------------------
// Merge mode
// ---------------------------------------------------------------------------

/// Whether a merge performs energy accounting.
///
/// `Reload` is used while reconstructing topology from saved state: the same
/// networks are merged over and over as elements come back, and charging the
/// friction loss each time would bleed energy (or detonate) saved machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Normal,
    Reload,
}

// ---------------------------------------------------------------------------
// ShaftModule
// ---------------------------------------------------------------------------

/// Owns every shaft network and the per-element bindings into them.
///
/// The element/network relationship is bidirectional: a network holds a set
/// of `(element, side)` parts, and each element records, per side, the
/// network it belongs to. Both directions live in this module and every
/// operation leaves them in agreement.
///
/// All operations run to completion on the calling thread; methods take
/// `&mut self`, so concurrent mutation of overlapping networks is ruled out
/// at compile time.
#[derive(Debug, Clone)]
pub struct ShaftModule {
    config: ShaftConfig,
    pub(crate) networks: SlotMap<NetworkId, ShaftNetwork>,
    pub(crate) elements: SlotMap<ElementId, ElementState>,
}

impl ShaftModule {
    pub fn new(config: ShaftConfig) -> Self {
        Self {
            config,
            networks: SlotMap::with_key(),
            elements: SlotMap::with_key(),
        }
    }

    pub fn config(&self) -> &ShaftConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn network(&self, net: NetworkId) -> Option<&ShaftNetwork> {
        self.networks.get(net)
    }

    pub fn network_ids(&self) -> Vec<NetworkId> {
        self.networks.keys().collect()
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    pub fn element_ids(&self) -> Vec<ElementId> {
        self.elements.keys().collect()
    }

    pub fn element_spec(&self, element: ElementId) -> Option<&ShaftElementSpec> {
        self.elements.get(element).map(|s| &s.spec)
    }

    /// The network bound to one side of an element.
    pub fn network_of(
        &self,
        element: ElementId,
        side: Direction,
    ) -> Result<Option<NetworkId>, ShaftError> {
        self.elements
            .get(element)
            .map(|s| s.shaft(side))
            .ok_or(ShaftError::ElementNotFound(element))
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register an element. Each group of internally coupled connectivity
    /// sides gets a fresh network; call [`Self::connect_element`] afterwards
    /// to merge with spatial neighbors.
    pub fn add_element(&mut self, spec: ShaftElementSpec) -> ElementId {
        let groups = coupling_groups(&spec.connectivity, &spec.coupling);
        let kind = match spec.fixed_speed {
            Some(rads) => NetworkKind::Fixed { rads },
            None => NetworkKind::Regular,
        };
        let element = self.elements.insert(ElementState::new(spec));
        for group in groups {
            let net = self.networks.insert_with_key(|id| ShaftNetwork::new(id, kind));
            if let Some(n) = self.networks.get_mut(net) {
                for &side in &group {
                    n.parts.insert(ShaftPart::new(element, side));
                }
            }
            if let Some(state) = self.elements.get_mut(element) {
                for &side in &group {
                    state.set_shaft(side, Some(net));
                }
            }
            self.refresh_cache(net);
        }
        element
    }

    /// Mark an element as mid-destruction. Rebuilds drop its parts instead
    /// of propagating through them.
    pub fn set_destroying(&mut self, element: ElementId) -> Result<(), ShaftError> {
        let state = self
            .elements
            .get_mut(element)
            .ok_or(ShaftError::ElementNotFound(element))?;
        state.destroying = true;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Merge
    // -----------------------------------------------------------------------

    /// Merge network `b` into network `a` and return the survivor along with
    /// the emitted events. A fixed network always survives, whichever side of
    /// the call it is on. With [`MergeMode::Normal`], energies are summed and
    /// the friction loss for the speed mismatch is charged; an incompatible
    /// mismatch additionally schedules a destructive failure at the invoking
    /// element, without aborting the merge.
    pub fn merge_networks(
        &mut self,
        a: NetworkId,
        b: NetworkId,
        invoker: Option<ElementId>,
        mode: MergeMode,
    ) -> Result<(NetworkId, Vec<ShaftEvent>), ShaftError> {
        let mut events = Vec::new();
        let survivor = self.merge_into(a, b, invoker, mode, &mut events)?;
        Ok((survivor, events))
    }

    fn merge_into(
        &mut self,
        a: NetworkId,
        b: NetworkId,
        invoker: Option<ElementId>,
        mode: MergeMode,
        events: &mut Vec<ShaftEvent>,
    ) -> Result<NetworkId, ShaftError> {
        if a == b {
            return Err(ShaftError::MergeWithSelf(a));
        }
        let (a, b) = {
            let na = self.networks.get(a).ok_or(ShaftError::NetworkNotFound(a))?;
            let nb = self.networks.get(b).ok_or(ShaftError::NetworkNotFound(b))?;
            if na.is_empty() {
                return Err(ShaftError::DeadNetwork(a));
            }
            if nb.is_empty() {
                return Err(ShaftError::DeadNetwork(b));
            }
            // Let the other network take the merge: a fixed network must
            // survive and must never be absorbed into a regular one.
            if nb.has_merge_precedence_over(na) {
                (b, a)
            } else {
                (a, b)
            }
        };
        debug!(survivor = ?a, absorbed = ?b, ?mode, "merging shaft networks");

        let mut delta_rads = 0.0;
        let mut new_energy = 0.0;
        let mut exploding = false;
        if mode == MergeMode::Normal {
            let na = self.networks.get(a).ok_or(ShaftError::NetworkNotFound(a))?;
            let nb = self.networks.get(b).ok_or(ShaftError::NetworkNotFound(b))?;
            delta_rads = (na.rads() - nb.rads()).abs();
            exploding = would_explode(na, nb, &self.config);
            new_energy = na.energy(&self.config) + nb.energy(&self.config);
        }
        if exploding {
            if let Some(invoker) = invoker {
                if let Some(state) = self.elements.get(invoker) {
                    debug!(?invoker, delta_rads, "speed mismatch, scheduling failure");
                    events.push(ShaftEvent::ExplosionScheduled {
                        element: invoker,
                        position: state.spec.position,
                        delta_rads,
                    });
                }
            }
            // The networks will unmerge when a component disappears, but
            // assume they might not: the merge still completes below.
        }

        let other = self
            .networks
            .remove(b)
            .ok_or(ShaftError::NetworkNotFound(b))?;
        for part in &other.parts {
            if let Some(state) = self.elements.get_mut(part.element) {
                state.set_shaft(part.side, Some(a));
            }
        }
        if let Some(survivor) = self.networks.get_mut(a) {
            survivor.parts.extend(other.parts.iter().copied());
        }
        self.refresh_cache(a);

        if mode == MergeMode::Normal {
            let loss = self.config.friction_loss_per_delta_rad * delta_rads * delta_rads;
            let crossed = match self.networks.get_mut(a) {
                Some(survivor) => survivor.set_energy(new_energy - loss, &self.config),
                None => false,
            };
            if crossed {
                self.push_publishes(a, events);
            }
        }
        Ok(a)
    }

    // -----------------------------------------------------------------------
    // Connect
    // -----------------------------------------------------------------------

    /// Connect every side of a freshly placed element, merging any adjacent
    /// networks into its own.
    pub fn connect_element(
        &mut self,
        lookup: &impl ElementLookup,
        element: ElementId,
        mode: MergeMode,
    ) -> Result<Vec<ShaftEvent>, ShaftError> {
        let sides = self
            .elements
            .get(element)
            .ok_or(ShaftError::ElementNotFound(element))?
            .spec
            .connectivity
            .clone();
        let mut events = Vec::new();
        for side in sides {
            if self
                .elements
                .get(element)
                .and_then(|s| s.shaft(side))
                .is_some()
            {
                events.extend(self.connect_shaft(lookup, element, side, mode)?);
            }
        }
        Ok(events)
    }

    /// Connect one side of an element to its spatial neighbor, merging the
    /// neighbor's network if it differs. Precondition: `(element, side)` is
    /// already a member part of its assigned network.
    pub fn connect_shaft(
        &mut self,
        lookup: &impl ElementLookup,
        element: ElementId,
        side: Direction,
        mode: MergeMode,
    ) -> Result<Vec<ShaftEvent>, ShaftError> {
        let part = ShaftPart::new(element, side);
        let mut current = self
            .elements
            .get(element)
            .ok_or(ShaftError::ElementNotFound(element))?
            .shaft(side)
            .ok_or(ShaftError::NotAMember { element, side })?;
        let is_member = self
            .networks
            .get(current)
            .is_some_and(|n| n.parts.contains(&part));
        if !is_member {
            return Err(ShaftError::NotAMember { element, side });
        }

        let mut events = Vec::new();
        for neighbor in self.neighbors(lookup, element) {
            // Merges earlier in this loop may have moved the element to a
            // different surviving network; always act on the live binding.
            let recorded = self
                .elements
                .get(element)
                .and_then(|s| s.shaft(neighbor.this_part.side));
            if recorded != Some(current) {
                warn!(
                    ?element,
                    side = ?neighbor.this_part.side,
                    "connecting part whose recorded network disagrees with the operating network"
                );
                continue;
            }
            let other_now = self
                .elements
                .get(neighbor.other_part.element)
                .and_then(|s| s.shaft(neighbor.other_part.side));
            let Some(other_net) = other_now else { continue };
            if other_net == current {
                continue;
            }
            current = self.merge_into(current, other_net, Some(element), mode, &mut events)?;

            // Inform both endpoints that their connectivity changed, using
            // whatever network each side ended up on.
            let this_net = self
                .elements
                .get(element)
                .and_then(|s| s.shaft(neighbor.this_part.side));
            let other_net = self
                .elements
                .get(neighbor.other_part.element)
                .and_then(|s| s.shaft(neighbor.other_part.side));
            match (this_net, other_net) {
                (Some(tn), Some(on)) => {
                    if tn != on {
                        warn!(?element, "connection endpoints disagree after merge");
                    }
                    events.push(ShaftEvent::Connected {
                        element,
                        side: neighbor.this_part.side,
                        network: tn,
                    });
                    events.push(ShaftEvent::Connected {
                        element: neighbor.other_part.element,
                        side: neighbor.other_part.side,
                        network: on,
                    });
                }
                _ => warn!(?element, "connection endpoint lost its network during merge"),
            }
        }
        Ok(events)
    }

    // -----------------------------------------------------------------------
    // Disconnect & rebuild
    // -----------------------------------------------------------------------

    /// Disconnect an element from every network it belongs to, notifying
    /// neighbors, parking each of its sides on a fresh singleton network
    /// that keeps the old speed, and rebuilding the partition of whatever
    /// remains.
    pub fn disconnect_element(
        &mut self,
        lookup: &impl ElementLookup,
        element: ElementId,
    ) -> Result<Vec<ShaftEvent>, ShaftError> {
        self.elements
            .get(element)
            .ok_or(ShaftError::ElementNotFound(element))?;
        let mut nets: Vec<NetworkId> = Vec::new();
        if let Some(state) = self.elements.get(element) {
            for dir in Direction::all() {
                if let Some(net) = state.shaft(dir) {
                    if !nets.contains(&net) {
                        nets.push(net);
                    }
                }
            }
        }
        let mut events = Vec::new();
        for net in nets {
            self.disconnect_from(lookup, net, element, &mut events)?;
        }
        Ok(events)
    }

    /// Remove an element entirely: disconnect it everywhere, then drop its
    /// record and the singleton networks the disconnect parked it on.
    pub fn remove_element(
        &mut self,
        lookup: &impl ElementLookup,
        element: ElementId,
    ) -> Result<Vec<ShaftEvent>, ShaftError> {
        self.set_destroying(element)?;
        let events = self.disconnect_element(lookup, element)?;
        if let Some(state) = self.elements.remove(element) {
            for dir in Direction::all() {
                let Some(net) = state.shaft(dir) else { continue };
                let emptied = match self.networks.get_mut(net) {
                    Some(n) => {
                        n.parts.retain(|p| p.element != element);
                        n.parts.is_empty()
                    }
                    None => continue,
                };
                if emptied {
                    self.networks.remove(net);
                } else {
                    self.refresh_cache(net);
                }
            }
        }
        Ok(events)
    }

    fn disconnect_from(
        &mut self,
        lookup: &impl ElementLookup,
        net: NetworkId,
        element: ElementId,
        events: &mut Vec<ShaftEvent>,
    ) -> Result<(), ShaftError> {
        let old_rads = self.networks.get(net).map_or(0.0, |n| clamp_rads(n.rads()));
        for neighbor in self.neighbors(lookup, element) {
            if neighbor.this_network != Some(net) {
                continue;
            }
            if neighbor.other_network != neighbor.this_network {
                warn!(?element, side = ?neighbor.side, "breaking an already broken connection");
            }
            events.push(ShaftEvent::Disconnected {
                element,
                side: neighbor.this_part.side,
                network: Some(net),
            });
            events.push(ShaftEvent::Disconnected {
                element: neighbor.other_part.element,
                side: neighbor.other_part.side,
                network: neighbor.other_network,
            });
            // The old network is about to be rebuilt and may be invalidated;
            // this side moves to its own network now.
            self.reassign_to_singleton(element, neighbor.this_part.side, old_rads);
        }
        // Sides without a live adjacency still need a definite home.
        for dir in Direction::all() {
            if self.elements.get(element).and_then(|s| s.shaft(dir)) == Some(net) {
                self.reassign_to_singleton(element, dir, old_rads);
            }
        }
        if let Some(n) = self.networks.get_mut(net) {
            n.parts.retain(|p| p.element != element);
        }
        self.rebuild_inner(lookup, net, events)
    }

    fn reassign_to_singleton(&mut self, element: ElementId, side: Direction, rads: f64) {
        let kind = match self.elements.get(element).and_then(|s| s.spec.fixed_speed) {
            Some(fixed) => NetworkKind::Fixed { rads: fixed },
            None => NetworkKind::Regular,
        };
        let net = self.networks.insert_with_key(|id| {
            let mut n = ShaftNetwork::new(id, kind);
            n.prime(rads, rads);
            n.parts.insert(ShaftPart::new(element, side));
            n
        });
        self.refresh_cache(net);
        if let Some(state) = self.elements.get_mut(element) {
            state.set_shaft(side, Some(net));
        }
    }

    /// Recompute the connected components of a network's parts, replacing it
    /// with one fresh network per component. O(n) over the network's parts.
    pub fn rebuild_network(
        &mut self,
        lookup: &impl ElementLookup,
        net: NetworkId,
    ) -> Result<Vec<ShaftEvent>, ShaftError> {
        let mut events = Vec::new();
        self.rebuild_inner(lookup, net, &mut events)?;
        Ok(events)
    }

    fn rebuild_inner(
        &mut self,
        lookup: &impl ElementLookup,
        net: NetworkId,
        events: &mut Vec<ShaftEvent>,
    ) -> Result<(), ShaftError> {
        let old = self
            .networks
            .remove(net)
            .ok_or(ShaftError::NetworkNotFound(net))?;
        let cur_rads = clamp_rads(old.rads());
        let old_marker = old.rads_last_published;
        let hysteresis = self.config.publish_hysteresis;
        let mut unseen: BTreeSet<ShaftPart> = old.parts;
        let mut seen: BTreeSet<ShaftPart> = BTreeSet::new();

        while let Some(&seed) = unseen.iter().next() {
            unseen.remove(&seed);
            let fresh = self.networks.insert_with_key(|id| {
                let mut n = ShaftNetwork::new(id, NetworkKind::Regular);
                n.prime(cur_rads, old_marker);
                n
            });
            let mut fixed_speed: Option<f64> = None;
            let mut queue: VecDeque<ShaftPart> = VecDeque::new();
            queue.push_back(seed);

            // Breadth-first walk of one component.
            while let Some(part) = queue.pop_front() {
                if !seen.insert(part) {
                    continue;
                }
                let Some(state) = self.elements.get_mut(part.element) else {
                    continue;
                };
                if state.destroying {
                    // Explicitly dropped: the element is on its way out, and
                    // nothing propagates through it.
                    state.set_shaft(part.side, None);
                    continue;
                }
                if let Some(r) = state.spec.fixed_speed {
                    fixed_speed = Some(r);
                }
                state.set_shaft(part.side, Some(fresh));
                if let Some(n) = self.networks.get_mut(fresh) {
                    n.parts.insert(part);
                }

                // Internal coupling: other sides of the same element that
                // share rotation with this one.
                let sides = self
                    .elements
                    .get(part.element)
                    .map(|s| s.spec.connectivity.clone())
                    .unwrap_or_default();
                for other_side in sides {
                    if other_side == part.side {
                        continue;
                    }
                    let couples = self
                        .elements
                        .get(part.element)
                        .is_some_and(|s| s.spec.coupling.connects(part.side, other_side));
                    if !couples {
                        continue;
                    }
                    let internal = ShaftPart::new(part.element, other_side);
                    if unseen.remove(&internal) {
                        queue.push_back(internal);
                    }
                }

                // Spatial adjacency: absorb reciprocal neighbor parts that
                // still belong to the pool being rebuilt.
                for neighbor in self.neighbors(lookup, part.element) {
                    if unseen.remove(&neighbor.other_part) {
                        queue.push_back(neighbor.other_part);
                    }
                }
            }

            let emptied = self.networks.get(fresh).is_none_or(|n| n.parts.is_empty());
            if emptied {
                self.networks.remove(fresh);
                continue;
            }
            if let Some(rads) = fixed_speed {
                if let Some(n) = self.networks.get_mut(fresh) {
                    n.make_fixed(rads);
                }
            }
            self.refresh_cache(fresh);
            let crossed = self
                .networks
                .get_mut(fresh)
                .is_some_and(|n| n.publish_check(hysteresis));
            if crossed {
                self.push_publishes(fresh, events);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Speed and energy surface
    // -----------------------------------------------------------------------

    pub fn rads(&self, net: NetworkId) -> Result<f64, ShaftError> {
        self.networks
            .get(net)
            .map(|n| n.rads())
            .ok_or(ShaftError::NetworkNotFound(net))
    }

    /// Write a network's speed (clamped). Returns publish events when the
    /// write crossed the hysteresis band.
    pub fn set_rads(&mut self, net: NetworkId, rads: f64) -> Result<Vec<ShaftEvent>, ShaftError> {
        let hysteresis = self.config.publish_hysteresis;
        let crossed = self
            .networks
            .get_mut(net)
            .ok_or(ShaftError::NetworkNotFound(net))?
            .set_rads(rads, hysteresis);
        let mut events = Vec::new();
        if crossed {
            self.push_publishes(net, &mut events);
        }
        Ok(events)
    }

    pub fn energy(&self, net: NetworkId) -> Result<f64, ShaftError> {
        self.networks
            .get(net)
            .map(|n| n.energy(&self.config))
            .ok_or(ShaftError::NetworkNotFound(net))
    }

    /// Write a network's energy, which derives the speed. Negative or
    /// non-finite energy stops the network.
    pub fn set_energy(&mut self, net: NetworkId, energy: f64) -> Result<Vec<ShaftEvent>, ShaftError> {
        let crossed = self
            .networks
            .get_mut(net)
            .ok_or(ShaftError::NetworkNotFound(net))?
            .set_energy(energy, &self.config);
        let mut events = Vec::new();
        if crossed {
            self.push_publishes(net, &mut events);
        }
        Ok(events)
    }

    pub fn mass(&self, net: NetworkId) -> Result<f64, ShaftError> {
        self.networks
            .get(net)
            .map(|n| n.mass(&self.config))
            .ok_or(ShaftError::NetworkNotFound(net))
    }

    /// Drain the standard drag loss for `dt` seconds from a network.
    pub fn apply_drag(&mut self, net: NetworkId, dt: f64) -> Result<Vec<ShaftEvent>, ShaftError> {
        let (energy, rads) = {
            let n = self
                .networks
                .get(net)
                .ok_or(ShaftError::NetworkNotFound(net))?;
            (n.energy(&self.config), n.rads())
        };
        self.set_energy(net, energy - self.config.standard_drag * rads * dt)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Resolve the live spatial adjacencies of an element: for each
    /// connectivity side, the element one step over that also exposes the
    /// reciprocal side.
    fn neighbors(&self, lookup: &impl ElementLookup, element: ElementId) -> Vec<ShaftNeighbor> {
        let mut out = Vec::new();
        let Some(state) = self.elements.get(element) else {
            return out;
        };
        for &dir in &state.spec.connectivity {
            let pos = state.spec.position.moved(dir);
            let Some(other) = lookup.element_at(pos) else {
                continue;
            };
            let Some(other_state) = self.elements.get(other) else {
                continue;
            };
            let back = dir.inverse();
            if !other_state.spec.connectivity.contains(&back) {
                continue;
            }
            out.push(ShaftNeighbor {
                this_part: ShaftPart::new(element, dir),
                this_network: state.shaft(dir),
                side: dir,
                other_part: ShaftPart::new(other, back),
                other_network: other_state.shaft(back),
            });
        }
        out
    }

    /// Recompute a network's derived caches: the element set and the mass
    /// sum over distinct elements.
    fn refresh_cache(&mut self, net: NetworkId) {
        let parts: Vec<ShaftPart> = match self.networks.get(net) {
            Some(n) => n.parts.iter().copied().collect(),
            None => return,
        };
        let mut element_set = BTreeSet::new();
        for part in &parts {
            element_set.insert(part.element);
        }
        let mut mass = 0.0;
        for &element in &element_set {
            if let Some(state) = self.elements.get(element) {
                mass += state.spec.mass;
            }
        }
        if let Some(n) = self.networks.get_mut(net) {
            n.elements = element_set;
            n.mass = mass;
        }
    }

    fn push_publishes(&self, net: NetworkId, events: &mut Vec<ShaftEvent>) {
        if let Some(n) = self.networks.get(net) {
            for &element in &n.elements {
                events.push(ShaftEvent::NeedPublish {
                    element,
                    network: net,
                });
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
