//! Tracing and OpenTelemetry Export
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` honoring
//! `RUST_LOG` on top of the crate defaults, a console fmt layer, and an
//! optional OTLP span export layer for any OpenTelemetry-compatible
//! collector.
//!
//! # Environment Variables
//!
//! - `OTEL_ENABLED`: set to "false" to skip span export (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector gRPC endpoint
//!   (default: http://localhost:4317)
//! - `OTEL_SERVICE_NAME`: service name attached to exported spans
//!   (default: intel-stream-client)
//!
//! # Usage
//!
//! ```ignore
//! let _guard = intel_stream_client::infrastructure::telemetry::init();
//! tracing::info!("Subscriber installed");
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Service name attached to spans when `OTEL_SERVICE_NAME` is unset.
const DEFAULT_SERVICE_NAME: &str = "intel-stream-client";

/// Collector endpoint used when `OTEL_EXPORTER_OTLP_ENDPOINT` is unset.
const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// Log directives applied under whatever `RUST_LOG` provides.
const DEFAULT_DIRECTIVES: [&str; 4] = [
    "intel_stream_client=info",
    "tungstenite=warn",
    "h2=warn",
    "hyper=warn",
];

/// Flushes and shuts the tracer provider down when dropped.
///
/// Keep the guard alive for the whole program; dropping it early stops
/// span export.
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let Some(provider) = self.tracer_provider.take() else {
            return;
        };
        if let Err(error) = provider.shutdown() {
            eprintln!("OpenTelemetry shutdown failed: {error}");
        }
    }
}

/// Runtime switches for the tracing stack.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Export spans over OTLP when true.
    pub enabled: bool,
    /// Collector endpoint the exporter dials.
    pub otlp_endpoint: String,
    /// Service name attached to exported spans.
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read the `OTEL_*` variables, falling back to the defaults above.
    #[must_use]
    pub fn from_env() -> Self {
        let enabled = !std::env::var("OTEL_ENABLED")
            .is_ok_and(|value| value.eq_ignore_ascii_case("false"));

        Self {
            enabled,
            otlp_endpoint: env_or("OTEL_EXPORTER_OTLP_ENDPOINT", DEFAULT_OTLP_ENDPOINT),
            service_name: env_or("OTEL_SERVICE_NAME", DEFAULT_SERVICE_NAME),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Install the global subscriber using configuration from the environment.
///
/// The returned guard must outlive every span the program records.
#[must_use]
pub fn init() -> TelemetryGuard {
    init_with_config(TelemetryConfig::from_env())
}

/// Install the global subscriber with explicit configuration.
///
/// When `config.enabled` is false only the filter and fmt layers are
/// installed and the guard holds no provider.
///
/// # Panics
///
/// Panics if the OTLP span exporter cannot be constructed.
#[must_use]
pub fn init_with_config(config: TelemetryConfig) -> TelemetryGuard {
    let provider = config.enabled.then(|| build_tracer_provider(&config));

    let otel_layer = provider.as_ref().map(|p| {
        let tracer = p.tracer(config.service_name.clone());
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(stream_filter())
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(otel_layer)
        .init();

    TelemetryGuard {
        tracer_provider: provider,
    }
}

#[allow(clippy::expect_used)]
fn stream_filter() -> EnvFilter {
    DEFAULT_DIRECTIVES
        .iter()
        .fold(EnvFilter::from_default_env(), |filter, directive| {
            filter.add_directive(directive.parse().expect("default log directive is valid"))
        })
}

#[allow(clippy::expect_used)]
fn build_tracer_provider(config: &TelemetryConfig) -> SdkTracerProvider {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
        .expect("OTLP span exporter construction failed");

    SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder()
                .with_service_name(config.service_name.clone())
                .build(),
        )
        .build()
}

// =============================================================================
// Tests
// =============================================================================
