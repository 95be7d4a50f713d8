//! Collar Sim - Entry Point
//!
//! Loads configuration, builds the collar roster and the collector
//! client, probes connectivity, and drives the cycle loop until the
//! duration bound is reached or the operator interrupts with Ctrl-C.
//! Exit code 0 on a completed or cancelled run, 1 on a configuration
//! or setup failure.

use collar_sim::collar::Collar;
use collar_sim::core::config::SimConfig;
use collar_sim::core::error::Result;
use collar_sim::simulation::{
    log_run_summary, CancelToken, RunCounters, RunSummary, Runner, SimulationState,
};
use collar_sim::spatial::Region;
use collar_sim::transport::{ApiClient, Transport};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("collar_sim=info")),
        )
        .init();

    match run() {
        Ok(Some(summary)) => {
            log_run_summary(&summary);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            // Operator declined to start without connectivity
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<Option<RunSummary>> {
    tracing::info!("collar-sim starting");

    let config = SimConfig::load_default()?;
    config.validate()?;

    let active_count = config.collars.iter().filter(|c| c.active).count();
    tracing::info!(
        backend = %config.backend.url,
        interval_secs = config.simulation.send_interval_secs,
        active_collars = active_count,
        debug = config.simulation.debug,
        "configuration loaded"
    );

    let region = Region::from_config(&config.region)?;

    let mut rng = match config.simulation.seed {
        Some(seed) => {
            tracing::info!(seed, "seeded RNG for reproducible run");
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    // Inactive collars are excluded from the roster entirely
    let collars: Vec<Collar> = config
        .collars
        .iter()
        .filter(|c| c.active)
        .map(|c| Collar::new(c, &config.parameters, &mut rng))
        .collect();

    for collar in &collars {
        tracing::info!(collar_id = %collar.id, animal = %collar.animal, "collar initialized");
    }

    let client = ApiClient::new(&config.backend)?;
    tracing::info!(url = %client.telemetry_url(), "collector client ready");

    let rt = Runtime::new()?;

    // Informational gate: the run may proceed without connectivity
    if rt.block_on(client.is_reachable()) {
        tracing::info!("collector reachable");
    } else {
        tracing::warn!(backend = %config.backend.url, "collector NOT reachable");
        if !confirm_continue_offline()? {
            tracing::info!("run aborted by operator");
            return Ok(None);
        }
    }

    tracing::info!("starting simulation, press Ctrl-C to stop");

    let debug = config.simulation.debug;
    let settings = config.simulation.clone();

    let summary = rt.block_on(async move {
        let cancel = Arc::new(CancelToken::new());

        let signal_cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling run");
                signal_cancel.cancel();
            }
        });

        let mut sim = SimulationState {
            collars,
            region,
            rng,
            counters: RunCounters::new(),
            debug,
        };
        let mut runner = Runner::new(&settings);

        runner.run(&mut sim, &client, &cancel).await
    });

    Ok(Some(summary))
}

/// Ask the operator whether to run without collector connectivity
fn confirm_continue_offline() -> Result<bool> {
    print!("Collector unreachable. Continue anyway? [y/N]: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
