//! Rotary Core -- shared vocabulary for the shaft simulation engine.
//!
//! This crate holds the stable identifiers, grid geometry, and engine
//! configuration that every Rotary crate depends on:
//!
//! - [`id::ElementId`] / [`id::NetworkId`] -- slotmap keys addressing shaft
//!   elements and shaft networks.
//! - [`geom::Direction`] / [`geom::GridPosition`] -- the 3D block grid shaft
//!   elements occupy, and the six axis directions they couple through.
//! - [`geom::ElementLookup`] -- the neighbor-lookup collaborator trait; the
//!   engine's only window into world storage.
//! - [`config::ShaftConfig`] -- explicit tunables (speed ceiling, friction,
//!   merge tolerance, hysteresis) passed into the engine constructor.

pub mod config;
pub mod geom;
pub mod id;
