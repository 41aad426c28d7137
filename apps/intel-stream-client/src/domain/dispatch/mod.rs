//! Frame Dispatch
//!
//! Registry mapping frame tags to consumer callbacks. Each tag owns a
//! single handler slot: registering a handler replaces whatever was there
//! before, so the most recent consumer wins. A separate slot carries
//! connection-state notifications.
//!
//! The registry is pure domain state. It performs no I/O and no logging;
//! callers act on the returned [`DispatchOutcome`].

use std::sync::Arc;

use parking_lot::RwLock;

use super::intelligence::{ArbitrageUpdate, IntelFrame, IntelPayload, RiskAlert, SocialSignal};

// =============================================================================
// Types
// =============================================================================

/// Result of dispatching a frame to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler was registered for the frame's tag and was invoked.
    Delivered,
    /// No handler was registered; the frame was discarded.
    NoHandler,
}

/// Single-occupancy handler slot for one frame tag.
struct Slot<T> {
    handler: RwLock<Option<Arc<dyn Fn(T, i64) + Send + Sync>>>,
}

impl<T> Slot<T> {
    const fn new() -> Self {
        Self {
            handler: RwLock::new(None),
        }
    }

    fn set(&self, handler: impl Fn(T, i64) + Send + Sync + 'static) {
        *self.handler.write() = Some(Arc::new(handler));
    }

    /// Invoke the current handler, if any.
    ///
    /// The callback runs outside the slot lock so handlers may re-register
    /// without deadlocking.
    fn invoke(&self, payload: T, timestamp: i64) -> DispatchOutcome {
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => {
                handler(payload, timestamp);
                DispatchOutcome::Delivered
            }
            None => DispatchOutcome::NoHandler,
        }
    }
}

// =============================================================================
// Handler Registry
// =============================================================================

/// Maps intelligence frame tags to registered consumer callbacks.
///
/// Thread-safe; registration and dispatch may happen concurrently from
/// different tasks. Handlers are plain synchronous closures invoked on the
/// dispatching task, in frame arrival order.
///
/// # Example
///
/// ```rust
/// use intel_stream_client::domain::dispatch::{DispatchOutcome, HandlerRegistry};
/// use intel_stream_client::domain::intelligence::{IntelFrame, IntelPayload};
///
/// let registry = HandlerRegistry::new();
/// registry.set_market(|data, _timestamp| println!("market: {data}"));
///
/// let frame = IntelFrame {
///     payload: IntelPayload::Market(serde_json::json!({"btc_dominance": 52.1})),
///     timestamp: 1_700_000_000_000,
/// };
/// assert_eq!(registry.dispatch(frame), DispatchOutcome::Delivered);
/// ```
pub struct HandlerRegistry {
    arbitrage: Slot<ArbitrageUpdate>,
    social: Slot<SocialSignal>,
    risk: Slot<RiskAlert>,
    market: Slot<serde_json::Value>,
    connection: RwLock<Option<Arc<dyn Fn(bool) + Send + Sync>>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arbitrage: Slot::new(),
            social: Slot::new(),
            risk: Slot::new(),
            market: Slot::new(),
            connection: RwLock::new(None),
        }
    }

    /// Register the arbitrage handler, replacing any previous one.
    pub fn set_arbitrage(&self, handler: impl Fn(ArbitrageUpdate, i64) + Send + Sync + 'static) {
        self.arbitrage.set(handler);
    }

    /// Register the social-signal handler, replacing any previous one.
    pub fn set_social(&self, handler: impl Fn(SocialSignal, i64) + Send + Sync + 'static) {
        self.social.set(handler);
    }

    /// Register the risk-alert handler, replacing any previous one.
    pub fn set_risk(&self, handler: impl Fn(RiskAlert, i64) + Send + Sync + 'static) {
        self.risk.set(handler);
    }

    /// Register the market-overview handler, replacing any previous one.
    pub fn set_market(&self, handler: impl Fn(serde_json::Value, i64) + Send + Sync + 'static) {
        self.market.set(handler);
    }

    /// Register the connection-state handler, replacing any previous one.
    ///
    /// The handler receives `true` when the stream becomes connected and
    /// `false` when an established connection ends.
    pub fn set_connection(&self, handler: impl Fn(bool) + Send + Sync + 'static) {
        *self.connection.write() = Some(Arc::new(handler));
    }

    /// Dispatch a decoded frame to the handler registered for its tag.
    ///
    /// `portfolio` frames have no registrable handler and always report
    /// [`DispatchOutcome::NoHandler`].
    pub fn dispatch(&self, frame: IntelFrame) -> DispatchOutcome {
        let timestamp = frame.timestamp;
        match frame.payload {
            IntelPayload::Arbitrage(update) => self.arbitrage.invoke(update, timestamp),
            IntelPayload::Social(signal) => self.social.invoke(signal, timestamp),
            IntelPayload::Risk(alert) => self.risk.invoke(alert, timestamp),
            IntelPayload::Market(data) => self.market.invoke(data, timestamp),
            IntelPayload::Portfolio(_) => DispatchOutcome::NoHandler,
        }
    }

    /// Notify the connection-state handler, if one is registered.
    pub fn notify_connection(&self, connected: bool) {
        let handler = self.connection.read().clone();
        if let Some(handler) = handler {
            handler(connected);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
