//! Telemetry wire record
//!
//! Snapshot of one collar's state at one tick, shaped for the collector's
//! fixed ingest format. Field names on the wire are the collector's
//! (Spanish) schema and must not change; the rounding policy below is
//! part of the interoperability contract.

use crate::collar::Collar;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One encoded telemetry snapshot, ready for transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub collar_id: String,
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
    #[serde(rename = "altitud")]
    pub altitude: f64,
    #[serde(rename = "precision")]
    pub gps_accuracy: f64,
    #[serde(rename = "bateria")]
    pub battery: f64,
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    #[serde(rename = "actividad")]
    pub activity: i32,
    /// UTC, RFC-3339 with trailing `Z`, captured at encode time
    pub timestamp: String,
}

impl TelemetryRecord {
    /// Encode a collar's live state into a transmissible record
    ///
    /// Pure snapshot apart from the timestamp capture. Rounding:
    /// position 6 decimals, altitude 1, GPS accuracy 2, battery 2,
    /// temperature 2; activity is already integral.
    pub fn from_collar(collar: &Collar) -> Self {
        Self {
            collar_id: collar.id.clone(),
            latitude: round_to(collar.latitude, 6),
            longitude: round_to(collar.longitude, 6),
            altitude: round_to(collar.altitude, 1),
            gps_accuracy: round_to(collar.gps_accuracy, 2),
            battery: round_to(collar.battery, 2),
            temperature: round_to(collar.temperature, 2),
            activity: collar.activity,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
