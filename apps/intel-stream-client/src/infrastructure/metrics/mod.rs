//! Stream Counters for Prometheus
//!
//! One process-wide recorder tracking frame traffic (received, dropped by
//! reason, commands sent) and connection churn, scraped through the
//! `/metrics` route on the health port.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

// =============================================================================
// Recorder
// =============================================================================

/// Install the Prometheus recorder and describe every metric.
///
/// Idempotent: repeated calls return the handle installed by the first.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("Prometheus recorder installation failed");
            describe_metrics();
            handle
        })
        .clone()
}

/// Handle for rendering the exposition text, `None` before `init_metrics`.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn describe_metrics() {
    describe_counter!(
        "intel_stream_messages_received_total",
        "Total intelligence frames received from the stream by tag"
    );
    describe_counter!(
        "intel_stream_messages_dropped_total",
        "Total intelligence frames dropped by reason"
    );
    describe_counter!(
        "intel_stream_commands_sent_total",
        "Total outbound commands sent to the stream by command type"
    );
    describe_counter!(
        "intel_stream_reconnects_total",
        "Total stream reconnection attempts"
    );
    describe_gauge!(
        "intel_stream_connected",
        "Whether the intelligence stream is currently connected (1 or 0)"
    );
}

// =============================================================================
// Recording
// =============================================================================

/// Metric labels for frame drop reasons.
#[derive(Debug, Clone, Copy)]
pub enum DropReason {
    /// The frame was not valid JSON or violated the envelope shape.
    Malformed,
    /// The frame carried a message tag this client does not know.
    UnknownTag,
    /// The frame decoded cleanly but no handler was registered for it.
    NoHandler,
}

impl DropReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::UnknownTag => "unknown_tag",
            Self::NoHandler => "no_handler",
        }
    }
}

/// Record an intelligence frame received from the stream.
pub fn record_message_received(tag: &'static str) {
    counter!(
        "intel_stream_messages_received_total",
        "tag" => tag
    )
    .increment(1);
}

/// Record an intelligence frame dropped before delivery.
pub fn record_message_dropped(reason: DropReason) {
    counter!(
        "intel_stream_messages_dropped_total",
        "reason" => reason.as_str()
    )
    .increment(1);
}

/// Record an outbound command sent to the stream.
pub fn record_command_sent(command: &'static str) {
    counter!(
        "intel_stream_commands_sent_total",
        "command" => command
    )
    .increment(1);
}

/// Record a stream reconnection attempt.
pub fn record_reconnect() {
    counter!("intel_stream_reconnects_total").increment(1);
}

/// Update the stream connection gauge.
pub fn set_connected(connected: bool) {
    gauge!("intel_stream_connected").set(if connected { 1.0 } else { 0.0 });
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(DropReason::Malformed => "malformed")]
    #[test_case(DropReason::UnknownTag => "unknown_tag")]
    #[test_case(DropReason::NoHandler => "no_handler")]
    fn drop_reason_label(reason: DropReason) -> &'static str {
        reason.as_str()
    }
}
