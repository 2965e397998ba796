//! Engine tunables, passed explicitly instead of read from globals.

use serde::{Deserialize, Serialize};

/// Tunables for the shaft engine. Constructed once and handed to
/// `ShaftModule::new`; tests vary these freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaftConfig {
    /// Speed above which shafts will (by default) explode, in rad/s.
    /// Consumed by the speed watchdog, not by the engine itself.
    pub max_shaft_speed: f64,
    /// Scales kinetic energy: `E = 0.5 * mass * rads^2 * energy_factor`.
    pub energy_factor: f64,
    /// Energy lost when merging, proportional to the *square* of the speed
    /// mismatch ("friction").
    pub friction_loss_per_delta_rad: f64,
    /// Standard drag, in J per rad per second.
    pub standard_drag: f64,
    /// Effective mass of a fixed-speed network (models an external load or
    /// source too large to perturb).
    pub static_mass: f64,
    /// Base of the allowed speed mismatch when merging, in rad/s.
    pub merge_tolerance_base: f64,
    /// How fast the allowed mismatch shrinks as the faster network speeds up.
    pub merge_tolerance_slope: f64,
    /// Relative speed drift that forces elements to republish.
    pub publish_hysteresis: f64,
}

impl Default for ShaftConfig {
    fn default() -> Self {
        Self {
            max_shaft_speed: 250.0,
            energy_factor: 1.0,
            friction_loss_per_delta_rad: 0.05,
            standard_drag: 0.02,
            static_mass: 1000.0,
            merge_tolerance_base: 50.0,
            merge_tolerance_slope: 0.1,
            publish_hysteresis: 0.05,
        }
    }
}

impl ShaftConfig {
    /// Largest tolerated speed mismatch for a merge where the faster
    /// participant runs at `faster_rads`. Shrinks linearly with speed.
    pub fn merge_tolerance(&self, faster_rads: f64) -> f64 {
        self.merge_tolerance_base - self.merge_tolerance_slope * faster_rads
    }
}
