//! Shaft Networks Module for the Rotary engine.
//!
//! Models a physically connected network of rotating mechanical elements
//! distributed across a block grid. Elements are added, removed, and
//! reconnected at runtime; the module maintains, at all times, the correct
//! partition of elements into maximal connected networks, each sharing one
//! rotational speed and aggregate mass, and conserves (or deliberately
//! dissipates) kinetic energy when networks merge or split.
//!
//! # Design
//!
//! - Elements are registered with the module via [`ShaftElementSpec`] and
//!   addressed by stable [`rotary_core::id::ElementId`] keys; the module
//!   owns the per-side element-to-network bindings.
//! - Networks live in an arena; a network whose part set empties is removed,
//!   and stale ids resolve to `None` rather than dangling.
//! - Operations return [`ShaftEvent`] lists instead of calling back into the
//!   host. Events are only delivered after all membership sets are updated.
//! - Spatial adjacency is resolved on demand through the host-provided
//!   [`rotary_core::geom::ElementLookup`] collaborator; the module stores no
//!   world topology.
//! - Speed writes clamp negative and non-finite values to 0 everywhere, so
//!   float accumulation across repeated merges and splits cannot poison the
//!   simulation.
//!
//! # Merging and splitting
//!
//! Connecting an element merges adjacent networks into its own, summing
//! energies and charging a friction loss proportional to the squared speed
//! mismatch; an incompatible mismatch schedules a destructive failure while
//! the merge completes normally. Disconnecting an element always triggers a
//! breadth-first rebuild that recomputes the connected components of the
//! remaining parts. Fixed-speed networks (generators, fixed drives) always
//! survive merges and ignore speed writes.
//!
//! All operations are synchronous and single-threaded; methods take
//! `&mut self`, so concurrent mutation of networks that might overlap in
//! membership is ruled out at compile time.

pub mod coupling;
pub mod element;
pub mod event;
pub mod module;
pub mod neighbor;
pub mod network;
pub mod persist;

pub use coupling::InternalCoupling;
pub use element::ShaftElementSpec;
pub use event::ShaftEvent;
pub use module::{MergeMode, ShaftError, ShaftModule};
pub use neighbor::ShaftNeighbor;
pub use network::{would_explode, NetworkKind, ShaftNetwork, ShaftPart};
pub use persist::{PersistError, SavedElementShafts};
