//! Collar state and construction
//!
//! One `Collar` is a simulated tracking device strapped to one animal.
//! All sensor fields are mutated in place once per cycle by the update
//! rules in `sensors.rs`; nothing else touches them.

use crate::collar::sensors::{GPS_ACCURACY_MAX, GPS_ACCURACY_MIN};
use crate::core::config::{CollarConfig, SensorParameters};
use rand::Rng;

/// Initial activity is drawn from this band at construction.
const INITIAL_ACTIVITY_MIN: i32 = 40;
const INITIAL_ACTIVITY_MAX: i32 = 70;

/// One simulated collar
#[derive(Debug, Clone)]
pub struct Collar {
    /// Stable device identity reported to the collector
    pub id: String,
    /// Animal label, informational only
    pub animal: String,

    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    /// Heading in radians; accumulated, never normalized. Only its
    /// cosine and sine are consumed
    pub heading: f64,
    /// GPS accuracy in meters, redrawn every tick
    pub gps_accuracy: f64,

    /// Battery percentage, 0-100, non-increasing
    pub battery: f64,
    /// Baseline the per-tick temperature draw is centered on
    pub base_temperature: f64,
    pub temperature: f64,
    /// Activity level 0-100, integral after every update
    pub activity: i32,

    pub(crate) params: SensorParameters,
}

impl Collar {
    /// Construct a collar from configuration
    ///
    /// Heading, GPS accuracy, and the initial activity level are drawn
    /// from the supplied RNG; everything else comes from config.
    pub fn new(
        config: &CollarConfig,
        params: &SensorParameters,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            id: config.id.clone(),
            animal: config.animal.clone(),
            latitude: config.initial_position.lat,
            longitude: config.initial_position.lng,
            altitude: config.initial_position.alt,
            heading: rng.gen_range(0.0..std::f64::consts::TAU),
            gps_accuracy: rng.gen_range(GPS_ACCURACY_MIN..GPS_ACCURACY_MAX),
            battery: config.initial_battery,
            base_temperature: config.base_temperature,
            temperature: config.base_temperature,
            activity: rng.gen_range(INITIAL_ACTIVITY_MIN..=INITIAL_ACTIVITY_MAX),
            params: params.clone(),
        }
    }

    /// One-line state summary for debug logging and the final report
    pub fn status_line(&self) -> String {
        format!(
            "{} ({}): Pos[{:.4}, {:.4}] Bat:{:.1}% Temp:{:.1}C Act:{}",
            self.id,
            self.animal,
            self.latitude,
            self.longitude,
            self.battery,
            self.temperature,
            self.activity
        )
    }
}
