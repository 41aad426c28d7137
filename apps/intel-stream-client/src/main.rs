//! Intel Stream Client Binary
//!
//! Starts the realtime intelligence stream client.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin intel-stream-client
//! ```
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target the local dev stack.
//!
//! - `TRADEPULSE_ENV`: LOCAL | PRODUCTION (default: LOCAL)
//! - `INTEL_STREAM_URL`: Stream endpoint override (default: per environment)
//! - `INTEL_STREAM_KEEPALIVE_INTERVAL_SECS`: Seconds between pings (default: 30)
//! - `INTEL_STREAM_RECONNECT_BASE_DELAY_MS`: Backoff delay unit (default: 1000)
//! - `INTEL_STREAM_MAX_RECONNECT_ATTEMPTS`: 0 = retry forever (default: 5)
//! - `INTEL_STREAM_WATCH_TOKENS`: Comma-separated tokens to subscribe on connect
//! - `INTEL_STREAM_HEALTH_PORT`: Health check HTTP port (default: 8090)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: intel-stream-client)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use intel_stream_client::infrastructure::health::{HealthServer, HealthServerState};
use intel_stream_client::infrastructure::telemetry;
use intel_stream_client::{
    AppConfig, IntelClient, IntelClientConfig, ReconnectConfig, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Grace period announced when a shutdown signal arrives.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("rustls ring provider must install before the first TLS dial");

    load_dotenv();

    let _telemetry_guard = telemetry::init();
    tracing::info!("Starting Intel Stream Client");
    let _metrics_handle = init_metrics();

    let config = AppConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // The client starts dialing as soon as it is constructed
    let client = IntelClient::new(client_config(&config), shutdown_token.child_token());
    register_handlers(&client, config.stream.watch_tokens.clone());

    spawn_health_server(
        config.server.health_port,
        client.clone(),
        shutdown_token.clone(),
    );

    tracing::info!("Intel stream client ready");

    await_shutdown(shutdown_token).await;

    tracing::info!("Intel stream client stopped");
    Ok(())
}

/// Install logging handlers for every intelligence tag plus the watch-list
/// subscription hook.
fn register_handlers(client: &IntelClient, watch_tokens: Vec<String>) {
    client
        .on_arbitrage(|update, _timestamp| {
            tracing::info!(
                id = %update.opportunity_id,
                token = %update.token_symbol,
                profit_pct = update.profit_percentage,
                confidence = update.confidence,
                status = ?update.status,
                "Arbitrage update"
            );
        })
        .on_social(|signal, _timestamp| {
            tracing::info!(
                id = %signal.signal_id,
                platform = %signal.platform,
                token = %signal.token,
                sentiment = signal.sentiment_score,
                mentions = signal.mentions_count,
                "Social signal"
            );
        })
        .on_risk(|alert, _timestamp| {
            if alert.risk_level.is_urgent() {
                tracing::warn!(
                    id = %alert.alert_id,
                    token = %alert.token_address,
                    level = ?alert.risk_level,
                    action_required = alert.action_required,
                    "Risk alert"
                );
            } else {
                tracing::info!(
                    id = %alert.alert_id,
                    token = %alert.token_address,
                    level = ?alert.risk_level,
                    "Risk alert"
                );
            }
        })
        .on_market(|data, _timestamp| {
            tracing::debug!(data = %data, "Market snapshot");
        });

    let commander = client.clone();
    client.on_connection(move |connected| {
        if connected {
            for token in &watch_tokens {
                commander.subscribe_to_token(token.clone());
            }
            commander.request_arbitrage_update();
            tracing::info!(tokens = watch_tokens.len(), "Stream online, watch list subscribed");
        } else {
            tracing::warn!("Stream offline");
        }
    });
}

/// Build the stream client configuration from application settings.
fn client_config(config: &AppConfig) -> IntelClientConfig {
    IntelClientConfig {
        url: config.intelligence_stream_url(),
        keepalive_interval: config.stream.keepalive_interval,
        reconnect: ReconnectConfig::new(
            config.stream.reconnect_base_delay,
            config.stream.max_reconnect_attempts,
        ),
    }
}

/// Run the probe server on its own task; a failure there must not take the
/// stream down.
fn spawn_health_server(port: u16, client: IntelClient, cancel: CancellationToken) {
    let state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        client,
    ));
    let server = HealthServer::new(port, state, cancel);

    tokio::spawn(async move {
        if let Err(error) = server.run().await {
            tracing::error!(error = %error, "Health server error");
        }
    });
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &AppConfig) {
    tracing::info!(
        environment = config.environment.as_str(),
        keepalive_secs = config.stream.keepalive_interval.as_secs(),
        reconnect_base_ms = config.stream.reconnect_base_delay.as_millis(),
        max_reconnect_attempts = config.stream.max_reconnect_attempts,
        watch_tokens = config.stream.watch_tokens.len(),
        health_port = config.server.health_port,
        "Configuration loaded"
    );
    tracing::debug!(
        stream_url = %config.intelligence_stream_url(),
        "WebSocket endpoint"
    );
}

/// Block until SIGINT or SIGTERM, then fire the shutdown token.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("SIGINT handler must install for graceful shutdown");
    };

    #[cfg(unix)]
    let sigterm = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler must install for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    let signal_name = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = sigterm => "SIGTERM",
    };

    shutdown_token.cancel();

    tracing::info!(
        signal = signal_name,
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Shutdown signal received, draining"
    );
}
