#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Intel Stream Client - Realtime Intelligence Feed
//!
//! A resilient WebSocket client that maintains a single connection to the
//! TradePulse intelligence stream and dispatches typed updates (arbitrage
//! opportunities, social signals, risk alerts, market snapshots) to
//! registered dashboard handlers.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core intelligence types with no I/O
//!   - `intelligence`: Typed stream payloads (arbitrage, social, risk)
//!   - `dispatch`: Handler registry routing frames by message tag
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `stream`: WebSocket client, frame codec, reconnect policy
//!   - `config`: Environment-driven configuration
//!   - `health`: Health check HTTP endpoint
//!   - `metrics`: Prometheus metrics
//!   - `telemetry`: OpenTelemetry tracing
//!
//! # Data Flow
//!
//! ```text
//!                       ┌──────────────┐     ┌──────────────┐
//! Intelligence WS ─────►│  IntelClient │────►│   Handler    │──► on_arbitrage
//!  (auto-reconnect)     │  FrameCodec  │     │   Registry   │──► on_social
//!                  ◄────┤              │     │              │──► on_risk
//!  pings, subscribes    └──────────────┘     └──────────────┘──► on_market
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core intelligence types and dispatch logic, no I/O.
pub mod domain;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::dispatch::{DispatchOutcome, HandlerRegistry};
pub use domain::intelligence::{
    ArbitrageStatus, ArbitrageUpdate, IntelFrame, IntelPayload, MessageTag, RiskAlert, RiskLevel,
    SocialSignal,
};

// Infrastructure config
pub use infrastructure::config::{
    AppConfig, ConfigError, Environment, ServerSettings, StreamSettings,
};

// Health server
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};

// Stream client
pub use infrastructure::stream::{
    CodecError, Command, ConnectionState, Envelope, FrameCodec, IntelClient, IntelClientConfig,
    IntelClientError, ReconnectConfig, ReconnectPolicy, StreamStatsSnapshot, TokenSelector,
};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
