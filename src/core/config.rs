//! Run configuration loaded from a TOML file
//!
//! Everything the simulator does is driven by this file: the collector
//! endpoint, the paddock boundary, the collar roster, and the shared
//! sensor parameters. `validate()` rejects malformed configuration before
//! any collar is constructed.

use crate::core::error::{Result, SimError};
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides the default config file path.
pub const CONFIG_PATH_ENV: &str = "COLLAR_SIM_CONFIG";

/// Default config file, resolved relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "collar-sim.toml";

/// Top-level simulator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    pub backend: BackendConfig,
    pub simulation: SimulationSettings,
    pub parameters: SensorParameters,
    pub region: RegionConfig,
    pub collars: Vec<CollarConfig>,
}

/// Collector endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the collector, e.g. `http://localhost:3000`
    pub url: String,
    /// Telemetry ingest path appended to the base URL
    pub endpoint: String,
    /// Per-request timeout; expiry counts as a delivery failure
    pub timeout_secs: u64,
}

/// Run-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
    /// Delay between telemetry cycles
    pub send_interval_secs: u64,
    /// Total run duration bound; 0 means unbounded
    #[serde(default)]
    pub total_duration_secs: u64,
    /// Log a per-collar status line every cycle
    #[serde(default)]
    pub debug: bool,
    /// RNG seed for reproducible runs; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Sensor model parameters shared by every collar
#[derive(Debug, Clone, Deserialize)]
pub struct SensorParameters {
    /// Per-tick step length in degrees along the current heading
    pub movement_speed: f64,
    /// Per-tick battery drain in percentage points
    pub battery_drain: f64,
    /// Half-width of the uniform band around each collar's baseline
    /// temperature
    pub temperature_variation: f64,
    /// Lower bound of the activity random walk (0-100)
    pub activity_min: i32,
    /// Upper bound of the activity random walk (0-100)
    pub activity_max: i32,
}

/// Paddock boundary as an ordered vertex list
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    pub vertices: Vec<VertexConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VertexConfig {
    pub lat: f64,
    pub lng: f64,
}

/// One collar's identity and initial state
#[derive(Debug, Clone, Deserialize)]
pub struct CollarConfig {
    pub id: String,
    /// Animal label, informational only
    pub animal: String,
    /// Inactive collars are excluded from the roster entirely
    #[serde(default = "default_active")]
    pub active: bool,
    pub initial_position: PositionConfig,
    /// Starting battery level, 0-100
    pub initial_battery: f64,
    /// Baseline body temperature the per-tick draw is centered on
    pub base_temperature: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PositionConfig {
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
}

fn default_active() -> bool {
    true
}

impl SimConfig {
    /// Load configuration from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: SimConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `COLLAR_SIM_CONFIG` if set, else the default path
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(Path::new(&path))
    }

    /// Validate configuration for internal consistency
    ///
    /// Geometric validation of the region boundary happens in
    /// `Region::new`; everything else is checked here. Any failure is
    /// fatal before a single collar is constructed.
    pub fn validate(&self) -> Result<()> {
        if self.backend.timeout_secs == 0 {
            return Err(SimError::Config(
                "backend.timeout_secs must be positive".into(),
            ));
        }
        if self.simulation.send_interval_secs == 0 {
            return Err(SimError::Config(
                "simulation.send_interval_secs must be positive".into(),
            ));
        }

        let p = &self.parameters;
        if p.movement_speed <= 0.0 {
            return Err(SimError::Config(
                "parameters.movement_speed must be positive".into(),
            ));
        }
        if p.battery_drain < 0.0 {
            return Err(SimError::Config(
                "parameters.battery_drain must not be negative".into(),
            ));
        }
        if p.temperature_variation <= 0.0 {
            return Err(SimError::Config(
                "parameters.temperature_variation must be positive".into(),
            ));
        }
        if p.activity_min < 0 || p.activity_max > 100 || p.activity_min > p.activity_max {
            return Err(SimError::Config(format!(
                "activity band [{}, {}] must satisfy 0 <= min <= max <= 100",
                p.activity_min, p.activity_max
            )));
        }

        if self.collars.is_empty() {
            return Err(SimError::Config("no collars configured".into()));
        }
        for collar in &self.collars {
            if collar.id.is_empty() {
                return Err(SimError::Config("collar with empty id".into()));
            }
            if !(0.0..=100.0).contains(&collar.initial_battery) {
                return Err(SimError::Config(format!(
                    "{}: initial_battery {} outside 0-100",
                    collar.id, collar.initial_battery
                )));
            }
        }

        Ok(())
    }
}
