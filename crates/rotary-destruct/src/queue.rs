//! Delayed destruction scheduling.

use rotary_core::geom::GridPosition;
use serde::{Deserialize, Serialize};

/// A destruction waiting to happen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingDestruction {
    pub position: GridPosition,
    /// Seconds until due. Zero-delay entries fire on the next advance,
    /// never at schedule time.
    pub delay: f64,
}

/// Queue of scheduled destructions. The host advances it once per tick and
/// executes whatever came due; the effect itself is out of scope here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestructionQueue {
    pending: Vec<PendingDestruction>,
}

impl DestructionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a destruction at `position` after `delay` seconds.
    pub fn schedule(&mut self, position: GridPosition, delay: f64) {
        self.pending.push(PendingDestruction { position, delay });
    }

    /// Advance time by `dt` seconds and return the positions that came due,
    /// in schedule order.
    pub fn advance(&mut self, dt: f64) -> Vec<GridPosition> {
        let mut due = Vec::new();
        self.pending.retain_mut(|entry| {
            entry.delay -= dt;
            if entry.delay <= 0.0 {
                due.push(entry.position);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
