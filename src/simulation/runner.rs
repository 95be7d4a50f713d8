//! Run controller
//!
//! Drives cycles until the configured duration bound is reached or the
//! cancellation token trips, sleeping the inter-cycle delay in between.
//! There is no whole-cycle retry; delivery failures are tallied per
//! record and surfaced in the summaries.

use crate::core::config::SimulationSettings;
use crate::simulation::cancel::CancelToken;
use crate::simulation::cycle::{self, Advisory, RunCounters, SimulationState};
use crate::transport::Transport;
use std::time::Duration;
use tokio::time::Instant;

/// Controller state machine: `Idle -> Running -> {Completed, Cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// The configured duration bound was reached
    Completed,
    /// The operator cancelled the run
    Cancelled,
}

/// Final report produced when the controller exits
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub end_state: RunState,
    pub counters: RunCounters,
    /// One status line per collar, in roster order
    pub final_states: Vec<String>,
}

/// Bounded, cancellable cycle loop
pub struct Runner {
    interval: Duration,
    /// `None` means unbounded
    duration_bound: Option<Duration>,
    state: RunState,
}

impl Runner {
    pub fn new(settings: &SimulationSettings) -> Self {
        Self {
            interval: Duration::from_secs(settings.send_interval_secs),
            duration_bound: match settings.total_duration_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run cycles until a terminal state is reached
    pub async fn run<T: Transport>(
        &mut self,
        sim: &mut SimulationState,
        transport: &T,
        cancel: &CancelToken,
    ) -> RunSummary {
        self.state = RunState::Running;
        let started = Instant::now();

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            duration_bound_secs = self.duration_bound.map(|d| d.as_secs()).unwrap_or(0),
            "run starting"
        );

        loop {
            // Checkpoint: never start a new cycle after cancellation
            if cancel.is_cancelled() {
                self.state = RunState::Cancelled;
                break;
            }

            let result = cycle::run_cycle(sim, transport, cancel).await;
            log_cycle(&result.advisories, &sim.counters);

            if result.interrupted || cancel.is_cancelled() {
                self.state = RunState::Cancelled;
                break;
            }

            if let Some(bound) = self.duration_bound {
                if started.elapsed() >= bound {
                    tracing::info!(
                        elapsed_secs = started.elapsed().as_secs(),
                        "duration bound reached"
                    );
                    self.state = RunState::Completed;
                    break;
                }
            }

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = cancel.cancelled() => {
                    self.state = RunState::Cancelled;
                    break;
                }
            }
        }

        RunSummary {
            end_state: self.state,
            counters: sim.counters,
            final_states: sim.collars.iter().map(|c| c.status_line()).collect(),
        }
    }
}

fn log_cycle(advisories: &[Advisory], counters: &RunCounters) {
    tracing::info!(
        cycle = counters.cycles,
        delivered = counters.delivered,
        failed = counters.failed,
        "cycle complete"
    );

    for advisory in advisories {
        match advisory {
            Advisory::LowBattery { collar_id, level } => {
                tracing::warn!(%collar_id, "low battery ({level:.1}%)");
            }
            Advisory::ElevatedTemperature {
                collar_id,
                temperature,
            } => {
                tracing::warn!(%collar_id, "elevated temperature ({temperature:.1}C)");
            }
        }
    }
}

/// Log the final summary after the controller exits
pub fn log_run_summary(summary: &RunSummary) {
    let c = &summary.counters;
    tracing::info!(
        end_state = ?summary.end_state,
        cycles = c.cycles,
        total_sends = c.total_sends(),
        delivered = c.delivered,
        failed = c.failed,
        success_rate_pct = c.success_rate(),
        "run finished"
    );

    for line in &summary.final_states {
        tracing::info!("final state: {line}");
    }
}
