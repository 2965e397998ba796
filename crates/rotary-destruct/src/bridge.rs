//! Bridge from shaft events to scheduled destructions.

use crate::queue::DestructionQueue;
use rotary_core::geom::GridPosition;
use rotary_shaft::ShaftEvent;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Feeds `ExplosionScheduled` shaft events into a [`DestructionQueue`].
///
/// The shaft module reports incompatible merges as events; this bridge turns
/// each report into a queued destruction at the invoking element's position.
/// Sooner than later, just not right now: the default delay is zero, which
/// still defers the effect to the host's next queue advance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestructBridge {
    pub queue: DestructionQueue,
    /// Delay applied to every scheduled destruction, in seconds.
    pub delay: f64,
}

impl DestructBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a batch of shaft events and schedule a destruction for every
    /// failure report. Returns how many were scheduled.
    pub fn apply(&mut self, events: &[ShaftEvent]) -> usize {
        let mut scheduled = 0;
        for event in events {
            if let ShaftEvent::ExplosionScheduled {
                position,
                delta_rads,
                ..
            } = event
            {
                debug!(?position, delta_rads, "scheduling shaft failure");
                self.queue.schedule(*position, self.delay);
                scheduled += 1;
            }
        }
        scheduled
    }

    /// Advance the underlying queue.
    pub fn advance(&mut self, dt: f64) -> Vec<GridPosition> {
        self.queue.advance(dt)
    }
}
