//! Cycle orchestrator
//!
//! One cycle advances every active collar, encodes its telemetry, hands
//! the record to the transport, and tallies the outcome. A per-record
//! delivery failure never aborts the cycle; cancellation observed
//! between collars skips the rest of the in-flight cycle.

use crate::collar::Collar;
use crate::simulation::cancel::CancelToken;
use crate::spatial::Region;
use crate::telemetry::TelemetryRecord;
use crate::transport::Transport;
use rand_chacha::ChaCha8Rng;

/// Battery percentage below which a low-power advisory is raised
pub const LOW_BATTERY_THRESHOLD: f64 = 20.0;
/// Temperature above which an elevated-temperature advisory is raised
pub const ELEVATED_TEMPERATURE_THRESHOLD: f64 = 39.5;

/// Run-scoped delivery tallies, constructed fresh per run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCounters {
    pub cycles: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_sends(&self) -> u64 {
        self.delivered + self.failed
    }

    /// Delivery success rate in percent; 0 when nothing was sent
    pub fn success_rate(&self) -> f64 {
        if self.total_sends() == 0 {
            0.0
        } else {
            self.delivered as f64 / self.total_sends() as f64 * 100.0
        }
    }
}

/// Threshold-triggered observation; never alters state or control flow
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    LowBattery { collar_id: String, level: f64 },
    ElevatedTemperature { collar_id: String, temperature: f64 },
}

/// Aggregate outcome of one cycle
#[derive(Debug, Clone)]
pub struct CycleResult {
    pub cycle: u64,
    pub delivered: usize,
    pub failed: usize,
    pub advisories: Vec<Advisory>,
    /// True when cancellation cut the cycle short before every collar
    /// was processed
    pub interrupted: bool,
}

/// Everything a cycle mutates, bundled so the loop signature stays flat
pub struct SimulationState {
    pub collars: Vec<Collar>,
    pub region: Region,
    pub rng: ChaCha8Rng,
    pub counters: RunCounters,
    /// Log a per-collar status line each cycle
    pub debug: bool,
}

/// Run one telemetry cycle across all collars
pub async fn run_cycle<T: Transport>(
    state: &mut SimulationState,
    transport: &T,
    cancel: &CancelToken,
) -> CycleResult {
    state.counters.cycles += 1;
    let cycle = state.counters.cycles;

    let mut result = CycleResult {
        cycle,
        delivered: 0,
        failed: 0,
        advisories: Vec::new(),
        interrupted: false,
    };

    for collar in state.collars.iter_mut() {
        if cancel.is_cancelled() {
            tracing::info!(cycle, "cycle interrupted, skipping remaining collars");
            result.interrupted = true;
            break;
        }

        collar.advance(&state.region, &mut state.rng);
        let record = TelemetryRecord::from_collar(collar);

        if state.debug {
            tracing::info!("{}", collar.status_line());
        }

        match transport.send(&record).await {
            Ok(_) => {
                state.counters.delivered += 1;
                result.delivered += 1;
                tracing::debug!(collar_id = %collar.id, "telemetry delivered");
            }
            Err(e) => {
                state.counters.failed += 1;
                result.failed += 1;
                tracing::warn!(collar_id = %collar.id, error = %e, "telemetry delivery failed");
            }
        }
    }

    if !result.interrupted {
        result.advisories = evaluate_advisories(&state.collars);
    }

    result
}

/// Evaluate both threshold advisories for every collar
///
/// The two advisories are independent; a collar can raise both in the
/// same cycle.
fn evaluate_advisories(collars: &[Collar]) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    for collar in collars {
        if collar.battery < LOW_BATTERY_THRESHOLD {
            advisories.push(Advisory::LowBattery {
                collar_id: collar.id.clone(),
                level: collar.battery,
            });
        }
        if collar.temperature > ELEVATED_TEMPERATURE_THRESHOLD {
            advisories.push(Advisory::ElevatedTemperature {
                collar_id: collar.id.clone(),
                temperature: collar.temperature,
            });
        }
    }

    advisories
}
