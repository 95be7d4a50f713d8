//! Collar Sim - Synthetic telemetry for livestock tracking collars
//!
//! Simulates a fleet of IoT collars grazing inside a polygonal paddock:
//! bounded random-walk movement, coupled battery/temperature/activity
//! sensor models, and a cycle loop that reports each collar's telemetry
//! to an HTTP collector.

pub mod collar;
pub mod core;
pub mod simulation;
pub mod spatial;
pub mod telemetry;
pub mod transport;
