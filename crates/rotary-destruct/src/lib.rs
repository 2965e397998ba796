//! Destruction plumbing for the Rotary engine.
//!
//! The shaft module never destroys anything itself; it only reports that a
//! destructive failure should happen ([`rotary_shaft::ShaftEvent`]). This
//! crate turns those reports, and out-of-band overspeed observations, into
//! scheduled destructions the host executes:
//!
//! - [`SpeedWatchdog`] -- compares a network's speed against configured
//!   bounds each tick and decides when the machine has had enough.
//! - [`DestructionQueue`] -- delayed destruction entries; due positions come
//!   back from [`DestructionQueue::advance`], never at schedule time.
//! - [`DestructBridge`] -- drains shaft events into the queue.

pub mod bridge;
pub mod queue;
pub mod watchdog;

pub use bridge::DestructBridge;
pub use queue::{DestructionQueue, PendingDestruction};
pub use watchdog::{SpeedWatchdog, WatchdogEvent};
