//! Intelligence Stream Wire Messages
//!
//! Serde types for the tagged JSON frame protocol. Every frame on the
//! wire, inbound or outbound, is a single JSON object with a `type` tag.

use serde::{Deserialize, Serialize};

// =============================================================================
// Inbound Envelope
// =============================================================================

/// Raw inbound frame before payload decoding.
///
/// All three fields are mandatory; a frame missing any of them is
/// malformed.
///
/// # Wire Format (JSON)
///
/// ```json
/// {
///   "type": "arbitrage",
///   "data": { "opportunity_id": "arb-7f3a", "...": "..." },
///   "timestamp": 1700000000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Frame tag selecting the payload shape.
    #[serde(rename = "type")]
    pub tag: String,
    /// Tag-specific payload.
    pub data: serde_json::Value,
    /// Producer timestamp in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

// =============================================================================
// Outbound Commands
// =============================================================================

/// Token argument for subscription commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSelector {
    /// Token symbol or address to watch.
    pub token: String,
}

/// Outbound command sent to the intelligence stream.
///
/// Commands with no argument serialize to a bare tag object.
///
/// # Wire Format (JSON)
///
/// ```json
/// {"type": "subscribe", "data": {"token": "SOL"}}
/// {"type": "unsubscribe", "data": {"token": "SOL"}}
/// {"type": "request_arbitrage"}
/// {"type": "ping"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Command {
    /// Start receiving updates scoped to a token.
    Subscribe(TokenSelector),
    /// Stop receiving updates scoped to a token.
    Unsubscribe(TokenSelector),
    /// Request an immediate arbitrage snapshot.
    RequestArbitrage,
    /// Application-level keep-alive.
    Ping,
}

impl Command {
    /// Build a subscribe command for a token.
    #[must_use]
    pub fn subscribe(token: impl Into<String>) -> Self {
        Self::Subscribe(TokenSelector {
            token: token.into(),
        })
    }

    /// Build an unsubscribe command for a token.
    #[must_use]
    pub fn unsubscribe(token: impl Into<String>) -> Self {
        Self::Unsubscribe(TokenSelector {
            token: token.into(),
        })
    }

    /// Wire tag of the command, for logging and metrics labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Subscribe(_) => "subscribe",
            Self::Unsubscribe(_) => "unsubscribe",
            Self::RequestArbitrage => "request_arbitrage",
            Self::Ping => "ping",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn subscribe_wire_shape() {
        let command = Command::subscribe("SOL");

        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({"type": "subscribe", "data": {"token": "SOL"}})
        );
    }

    #[test]
    fn unsubscribe_wire_shape() {
        let command = Command::unsubscribe("BONK");

        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({"type": "unsubscribe", "data": {"token": "BONK"}})
        );
    }

    #[test]
    fn request_arbitrage_wire_shape_omits_data() {
        assert_eq!(
            serde_json::to_value(Command::RequestArbitrage).unwrap(),
            json!({"type": "request_arbitrage"})
        );
    }

    #[test]
    fn ping_wire_shape_omits_data() {
        assert_eq!(
            serde_json::to_value(Command::Ping).unwrap(),
            json!({"type": "ping"})
        );
    }

    #[test]
    fn command_kind_matches_wire_tag() {
        assert_eq!(Command::subscribe("SOL").kind(), "subscribe");
        assert_eq!(Command::unsubscribe("SOL").kind(), "unsubscribe");
        assert_eq!(Command::RequestArbitrage.kind(), "request_arbitrage");
        assert_eq!(Command::Ping.kind(), "ping");
    }

    #[test]
    fn envelope_deserializes_full_frame() {
        let json = r#"{
            "type": "market",
            "data": {"btc_dominance": 52.1},
            "timestamp": 1700000000000
        }"#;

        let envelope: Envelope = serde_json::from_str(json).unwrap();

        assert_eq!(envelope.tag, "market");
        assert_eq!(envelope.timestamp, 1_700_000_000_000);
        assert_eq!(envelope.data, json!({"btc_dominance": 52.1}));
    }

    #[test]
    fn envelope_requires_timestamp() {
        let json = r#"{"type": "market", "data": {}}"#;
        assert!(serde_json::from_str::<Envelope>(json).is_err());
    }

    #[test]
    fn envelope_requires_data() {
        let json = r#"{"type": "market", "timestamp": 1}"#;
        assert!(serde_json::from_str::<Envelope>(json).is_err());
    }
}
