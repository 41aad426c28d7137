//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the WebSocket transport, configuration loading,
//! and the operational surfaces (health, metrics, telemetry).

/// Intelligence stream WebSocket client.
pub mod stream;

/// Configuration loading.
pub mod config;

/// Health check HTTP endpoint.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
