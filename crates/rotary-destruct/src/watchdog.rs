//! Threshold watchdog over a monitored value, typically a network's speed.

use rotary_core::config::ShaftConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the watchdog concluded from one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogEvent {
    /// The decaying timeout ran out; destroy the machine.
    Destroy,
    /// The value is out of bounds this tick.
    FailureTick,
    /// The value came back in bounds after failing.
    FailureCancelled,
}

/// Watches a value against `[min, max]` bounds. Excursions beyond the
/// tolerance drain a timeout proportionally to how far out of bounds the
/// value is; when the timeout runs out the watchdog calls for destruction.
/// The first over-tolerance observation after a quiet stretch is forgiven
/// (the "joker"), so a single spike never kills a machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedWatchdog {
    min: f64,
    max: f64,
    overflow_tolerance: f64,
    timeout_reset: f64,
    timeout: f64,
    joker: bool,
    failing: bool,
}

impl SpeedWatchdog {
    pub fn new(min: f64, max: f64, overflow_tolerance: f64, timeout_reset: f64) -> Self {
        Self {
            min,
            max,
            overflow_tolerance,
            timeout_reset,
            timeout: timeout_reset,
            joker: true,
            failing: false,
        }
    }

    /// The standard shaft overspeed watchdog: destroy when the speed holds
    /// above the absolute ceiling.
    pub fn shaft(config: &ShaftConfig) -> Self {
        Self::new(0.0, config.max_shaft_speed, 0.0, 2.0)
    }

    /// Feed one observation of the monitored value, `dt` seconds after the
    /// previous one.
    pub fn observe(&mut self, value: f64, dt: f64) -> Vec<WatchdogEvent> {
        let mut events = Vec::new();
        let overflow = (value - self.max).max(self.min - value);
        let tolerated = (overflow - self.overflow_tolerance).max(0.0);

        if tolerated > 0.0 {
            if self.joker {
                // One spike is free.
                self.joker = false;
            } else {
                self.timeout -= dt * tolerated;
            }
        } else {
            self.joker = true;
        }
        if self.timeout > self.timeout_reset {
            self.timeout = self.timeout_reset;
        }
        if self.timeout < 0.0 {
            debug!(value, "watchdog timeout expired, destroying");
            events.push(WatchdogEvent::Destroy);
        }

        if overflow > 0.0 {
            events.push(WatchdogEvent::FailureTick);
            self.failing = true;
        } else if self.failing {
            events.push(WatchdogEvent::FailureCancelled);
            self.failing = false;
        }
        events
    }

    /// Restore the full timeout, keeping bounds.
    pub fn reset(&mut self) {
        self.timeout = self.timeout_reset;
        self.joker = true;
    }

    /// Effectively turn the watchdog off.
    pub fn disable(&mut self) {
        self.max = 1e8;
        self.min = -self.max;
        self.timeout_reset = 1e7;
        self.timeout = self.timeout_reset;
    }
}
