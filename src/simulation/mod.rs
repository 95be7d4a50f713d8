pub mod cancel;
pub mod cycle;
pub mod runner;

pub use cancel::CancelToken;
pub use cycle::{run_cycle, Advisory, CycleResult, RunCounters, SimulationState};
pub use runner::{log_run_summary, RunState, RunSummary, Runner};
