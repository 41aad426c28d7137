//! Operational HTTP Surface
//!
//! Small axum server answering orchestrator probes and scrapes for the
//! stream client process.
//!
//! # Endpoints
//!
//! - `GET /health` - full JSON report (connection state plus counters)
//! - `GET /healthz` - liveness, always 200
//! - `GET /readyz` - readiness, 200 only while the stream is connected
//! - `GET /metrics` - Prometheus text exposition

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::metrics::get_metrics_handle;
use crate::infrastructure::stream::{ConnectionState, IntelClient, StreamStatsSnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

type SharedState = Arc<HealthServerState>;

// =============================================================================
// Report Types
// =============================================================================

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall verdict, driven by the stream connection.
    pub status: HealthStatus,
    /// Crate version serving the report.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Wall-clock time the report was taken.
    pub current_time: DateTime<Utc>,
    /// Stream connection detail.
    pub connection: ConnectionReport,
}

impl HealthResponse {
    // Status is derived from the one captured report so the two fields
    // cannot disagree mid-transition.
    fn capture(state: &HealthServerState) -> Self {
        let connection = ConnectionReport::from_client(&state.client);
        let status = if connection.connected {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        Self {
            status,
            version: state.version.clone(),
            uptime_secs: state.started_at.elapsed().as_secs(),
            current_time: Utc::now(),
            connection,
        }
    }
}

/// Two-valued verdict: the process is healthy exactly while its one
/// stream connection is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Stream connected and delivering.
    Healthy,
    /// Stream disconnected or still dialing.
    Unhealthy,
}

impl HealthStatus {
    /// Map a connection state onto the probe verdict.
    #[must_use]
    pub const fn from_state(state: ConnectionState) -> Self {
        if state.is_connected() {
            Self::Healthy
        } else {
            Self::Unhealthy
        }
    }

    const fn status_code(self) -> StatusCode {
        match self {
            Self::Healthy => StatusCode::OK,
            Self::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Stream connection section of the health report.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    /// Connection state name.
    pub state: &'static str,
    /// Whether the stream is connected.
    pub connected: bool,
    /// Stream traffic counters.
    pub stats: StreamStatsSnapshot,
}

impl ConnectionReport {
    fn from_client(client: &IntelClient) -> Self {
        let state = client.state();
        Self {
            state: state.as_str(),
            connected: state.is_connected(),
            stats: client.stats(),
        }
    }
}

// =============================================================================
// Server
// =============================================================================

/// State shared across probe handlers.
pub struct HealthServerState {
    version: String,
    started_at: Instant,
    client: IntelClient,
}

impl HealthServerState {
    /// Capture the version string and client handle the probes report on.
    #[must_use]
    pub fn new(version: String, client: IntelClient) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            client,
        }
    }
}

/// Probe server bound to the configured health port.
pub struct HealthServer {
    port: u16,
    state: SharedState,
    cancel: CancellationToken,
}

impl HealthServer {
    /// Create a server that will shut down when `cancel` fires.
    #[must_use]
    pub const fn new(port: u16, state: SharedState, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Serve probes until cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`HealthServerError::Bind`] when the port is taken and
    /// [`HealthServerError::Serve`] when the HTTP server dies.
    pub async fn run(self) -> Result<(), HealthServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr).await.map_err(|source| {
            HealthServerError::Bind {
                port: self.port,
                source,
            }
        })?;

        tracing::info!(port = self.port, "Health server listening");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(HealthServerError::Serve)?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(liveness))
        .route("/readyz", get(readiness))
        .route("/metrics", get(metrics_text))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let report = HealthResponse::capture(&state);
    (report.status.status_code(), Json(report))
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness(State(state): State<SharedState>) -> impl IntoResponse {
    if state.client.is_connected() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_text() -> impl IntoResponse {
    let Some(handle) = get_metrics_handle() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [("content-type", "text/plain")],
            "Metrics not initialized".to_string(),
        );
    };
    (
        StatusCode::OK,
        [("content-type", PROMETHEUS_CONTENT_TYPE)],
        handle.render(),
    )
}

// =============================================================================
// Errors
// =============================================================================

/// Ways the probe server can fail.
#[derive(Debug, thiserror::Error)]
pub enum HealthServerError {
    /// The listener socket could not be bound.
    #[error("health server failed to bind port {port}")]
    Bind {
        /// Port that was requested.
        port: u16,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server exited abnormally.
    #[error("health server terminated")]
    Serve(#[source] std::io::Error),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(ConnectionState::Connected => HealthStatus::Healthy)]
    #[test_case(ConnectionState::Connecting => HealthStatus::Unhealthy)]
    #[test_case(ConnectionState::Disconnected => HealthStatus::Unhealthy)]
    fn verdict_for(state: ConnectionState) -> HealthStatus {
        HealthStatus::from_state(state)
    }

    #[test]
    fn verdict_picks_the_http_status() {
        assert_eq!(HealthStatus::Healthy.status_code(), StatusCode::OK);
        assert_eq!(
            HealthStatus::Unhealthy.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn health_report_serializes_counters() {
        let report = HealthResponse {
            status: HealthStatus::Healthy,
            version: "1.2.3".to_string(),
            uptime_secs: 90,
            current_time: Utc::now(),
            connection: ConnectionReport {
                state: "connected",
                connected: true,
                stats: StreamStatsSnapshot {
                    messages_received: 42,
                    messages_dropped: 1,
                    commands_sent: 7,
                    reconnects: 2,
                },
            },
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["version"], "1.2.3");
        assert_eq!(value["connection"]["state"], "connected");
        assert_eq!(value["connection"]["stats"]["messages_received"], 42);
        assert_eq!(value["connection"]["stats"]["reconnects"], 2);
    }
}
