//! HTTP client for the telemetry collector
//!
//! A send is successful only when the collector answers HTTP 201; any
//! other status, a timeout, a connection failure, or an unparseable ack
//! body counts as a delivery failure. Failures are classified so the
//! orchestrator can log them, but they are never fatal to the run.

use crate::core::config::BackendConfig;
use crate::core::error::{Result, SimError};
use crate::telemetry::TelemetryRecord;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Identifies the simulator to the collector on every request.
const USER_AGENT: &str = concat!("collar-sim/", env!("CARGO_PKG_VERSION"));

/// Collector acknowledgement body, passed through as parsed JSON
pub type Ack = serde_json::Value;

/// Why a single record failed to deliver
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("collector returned HTTP {code}: {body}")]
    Rejected { code: u16, body: String },

    #[error("malformed ack: {0}")]
    MalformedAck(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connection(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Tally of a batch send; no atomicity across records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub delivered: usize,
    pub failed: usize,
    pub total: usize,
}

/// Seam between the orchestrator and the collector
///
/// The production implementation is [`ApiClient`]; tests substitute a
/// stub to script per-record outcomes.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Deliver one record; success only on the collector's 201 ack
    async fn send(&self, record: &TelemetryRecord) -> std::result::Result<Ack, TransportError>;

    /// Connectivity probe, consulted once before a run starts
    async fn is_reachable(&self) -> bool;

    /// Deliver a batch one record at a time, tallying outcomes
    async fn send_all(&self, records: &[TelemetryRecord]) -> BatchOutcome {
        let mut delivered = 0;
        let mut failed = 0;

        for record in records {
            match self.send(record).await {
                Ok(_) => delivered += 1,
                Err(_) => failed += 1,
            }
        }

        BatchOutcome {
            delivered,
            failed,
            total: records.len(),
        }
    }
}

/// HTTP transport backed by the configured collector endpoint
pub struct ApiClient {
    client: reqwest::Client,
    telemetry_url: String,
    probe_url: String,
}

impl ApiClient {
    /// Build a client from backend configuration
    ///
    /// The configured timeout applies to every request, probe included.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SimError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            telemetry_url: format!("{}{}", config.url, config.endpoint),
            probe_url: format!("{}/api", config.url),
        })
    }

    pub fn telemetry_url(&self) -> &str {
        &self.telemetry_url
    }
}

impl Transport for ApiClient {
    async fn send(&self, record: &TelemetryRecord) -> std::result::Result<Ack, TransportError> {
        let response = self
            .client
            .post(&self.telemetry_url)
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            let ack = response
                .json::<Ack>()
                .await
                .map_err(|e| TransportError::MalformedAck(e.to_string()))?;
            Ok(ack)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::Rejected {
                code: status.as_u16(),
                body,
            })
        }
    }

    async fn is_reachable(&self) -> bool {
        // A 404 still proves something is listening at the base URL
        match self.client.get(&self.probe_url).send().await {
            Ok(response) => matches!(response.status().as_u16(), 200 | 404),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_urls_from_config() {
        let config = BackendConfig {
            url: "http://localhost:3000".into(),
            endpoint: "/api/telemetria".into(),
            timeout_secs: 5,
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.telemetry_url(), "http://localhost:3000/api/telemetria");
        assert_eq!(client.probe_url, "http://localhost:3000/api");
    }

    struct ScriptedTransport {
        fail_on: Vec<&'static str>,
    }

    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            record: &TelemetryRecord,
        ) -> std::result::Result<Ack, TransportError> {
            if self.fail_on.iter().any(|id| *id == record.collar_id) {
                Err(TransportError::Connection("refused".into()))
            } else {
                Ok(serde_json::json!({ "status": "ok" }))
            }
        }

        async fn is_reachable(&self) -> bool {
            true
        }
    }

    fn record_for(id: &str) -> TelemetryRecord {
        TelemetryRecord {
            collar_id: id.into(),
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            gps_accuracy: 5.0,
            battery: 50.0,
            temperature: 38.5,
            activity: 40,
            timestamp: "2024-01-01T00:00:00.000000Z".into(),
        }
    }

    #[tokio::test]
    async fn test_send_all_tallies_mixed_outcomes() {
        let transport = ScriptedTransport {
            fail_on: vec!["COLLAR-002"],
        };
        let records = vec![
            record_for("COLLAR-001"),
            record_for("COLLAR-002"),
            record_for("COLLAR-003"),
        ];

        let outcome = transport.send_all(&records).await;

        assert_eq!(outcome.delivered, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.total, 3);
    }

    #[tokio::test]
    async fn test_send_all_empty_batch() {
        let transport = ScriptedTransport { fail_on: vec![] };
        let outcome = transport.send_all(&[]).await;

        assert_eq!(outcome.delivered, 0);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.total, 0);
    }
}
