//! Frame Codec
//!
//! Decodes tagged JSON text frames into [`IntelFrame`]s and encodes
//! outbound [`Command`]s. One decode failure never carries state into the
//! next frame; the codec is stateless.

use crate::domain::intelligence::{IntelFrame, IntelPayload, MessageTag};

use super::messages::{Command, Envelope};

/// Maximum length of raw text echoed into error messages.
const PREVIEW_LEN: usize = 50;

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON encoding/decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame tag outside the known protocol set.
    #[error("unknown message tag: {0}")]
    UnknownTag(String),

    /// Text that is not a tagged JSON object.
    #[error("invalid frame format: {0}")]
    InvalidFormat(String),
}

// =============================================================================
// Codec
// =============================================================================

/// Codec for the tagged JSON frame protocol.
#[derive(Debug, Default, Clone)]
pub struct FrameCodec;

impl FrameCodec {
    /// Create a new frame codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode a text frame into an [`IntelFrame`].
    ///
    /// The envelope's `type` tag selects the payload shape. `arbitrage`,
    /// `social`, and `risk` payloads decode into typed structs; `market`
    /// and `portfolio` payloads pass through as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidFormat`] when the text is not a JSON
    /// object carrying a string `type` field, [`CodecError::UnknownTag`]
    /// for tags outside the protocol set, and [`CodecError::Json`] when
    /// the envelope or payload fails to deserialize.
    pub fn decode(&self, text: &str) -> Result<IntelFrame, CodecError> {
        let trimmed = text.trim();

        if !trimmed.starts_with('{') {
            return Err(CodecError::InvalidFormat(format!(
                "expected JSON object, got: {}...",
                preview(trimmed)
            )));
        }

        let value: serde_json::Value = serde_json::from_str(trimmed)?;

        let Some(tag_str) = value.get("type").and_then(serde_json::Value::as_str) else {
            return Err(CodecError::InvalidFormat(format!(
                "missing string `type` field: {}...",
                preview(trimmed)
            )));
        };

        let Some(tag) = MessageTag::from_wire(tag_str) else {
            return Err(CodecError::UnknownTag(tag_str.to_string()));
        };

        let envelope: Envelope = serde_json::from_value(value)?;

        let payload = match tag {
            MessageTag::Arbitrage => {
                IntelPayload::Arbitrage(serde_json::from_value(envelope.data)?)
            }
            MessageTag::Social => IntelPayload::Social(serde_json::from_value(envelope.data)?),
            MessageTag::Risk => IntelPayload::Risk(serde_json::from_value(envelope.data)?),
            MessageTag::Market => IntelPayload::Market(envelope.data),
            MessageTag::Portfolio => IntelPayload::Portfolio(envelope.data),
        };

        Ok(IntelFrame {
            payload,
            timestamp: envelope.timestamp,
        })
    }

    /// Encode an outbound command as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if serialization fails.
    pub fn encode(&self, command: &Command) -> Result<String, CodecError> {
        Ok(serde_json::to_string(command)?)
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_LEN).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::intelligence::{ArbitrageStatus, RiskLevel};

    #[test]
    fn decodes_arbitrage_frame() {
        let codec = FrameCodec::new();
        let text = r#"{
            "type": "arbitrage",
            "data": {
                "opportunity_id": "arb-7f3a",
                "token_symbol": "SOL",
                "profit_percentage": 2.4,
                "confidence": 0.87,
                "execution_time": "2m",
                "status": "active"
            },
            "timestamp": 1700000000000
        }"#;

        let frame = codec.decode(text).unwrap();

        assert_eq!(frame.timestamp, 1_700_000_000_000);
        let IntelPayload::Arbitrage(update) = frame.payload else {
            panic!("expected arbitrage payload");
        };
        assert_eq!(update.opportunity_id, "arb-7f3a");
        assert_eq!(update.status, ArbitrageStatus::Active);
    }

    #[test]
    fn decodes_social_frame() {
        let codec = FrameCodec::new();
        let text = r#"{
            "type": "social",
            "data": {
                "signal_id": "soc-91c2",
                "platform": "twitter",
                "token": "BONK",
                "sentiment_score": 0.62,
                "hype_level": "rising",
                "mentions_count": 1820,
                "influence_score": 0.44
            },
            "timestamp": 1700000000001
        }"#;

        let frame = codec.decode(text).unwrap();

        let IntelPayload::Social(signal) = frame.payload else {
            panic!("expected social payload");
        };
        assert_eq!(signal.token, "BONK");
        assert_eq!(signal.mentions_count, 1820);
    }

    #[test]
    fn decodes_risk_frame() {
        let codec = FrameCodec::new();
        let text = r#"{
            "type": "risk",
            "data": {
                "alert_id": "risk-04bd",
                "token_address": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
                "risk_level": "HIGH",
                "risk_factors": ["liquidity_drain"],
                "confidence": 0.91,
                "action_required": true
            },
            "timestamp": 1700000000002
        }"#;

        let frame = codec.decode(text).unwrap();

        let IntelPayload::Risk(alert) = frame.payload else {
            panic!("expected risk payload");
        };
        assert_eq!(alert.risk_level, RiskLevel::High);
        assert!(alert.action_required);
    }

    #[test]
    fn market_payload_passes_through_raw() {
        let codec = FrameCodec::new();
        let text = r#"{"type": "market", "data": {"btc_dominance": 52.1}, "timestamp": 3}"#;

        let frame = codec.decode(text).unwrap();

        assert_eq!(
            frame.payload,
            IntelPayload::Market(json!({"btc_dominance": 52.1}))
        );
    }

    #[test]
    fn portfolio_payload_passes_through_raw() {
        let codec = FrameCodec::new();
        let text = r#"{"type": "portfolio", "data": {"total_value": 1042.5}, "timestamp": 4}"#;

        let frame = codec.decode(text).unwrap();

        assert_eq!(
            frame.payload,
            IntelPayload::Portfolio(json!({"total_value": 1042.5}))
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let codec = FrameCodec::new();
        let text = "\n  {\"type\": \"market\", \"data\": {}, \"timestamp\": 1}  \n";

        assert!(codec.decode(text).is_ok());
    }

    #[test]
    fn unknown_tag_is_reported_with_the_tag() {
        let codec = FrameCodec::new();
        let text = r#"{"type": "weather", "data": {}, "timestamp": 1}"#;

        let err = codec.decode(text).unwrap_err();

        assert!(matches!(err, CodecError::UnknownTag(tag) if tag == "weather"));
    }

    #[test]
    fn invalid_json_is_a_json_error() {
        let codec = FrameCodec::new();

        let err = codec.decode("{not json").unwrap_err();

        assert!(matches!(err, CodecError::Json(_)));
    }

    #[test]
    fn non_object_frame_is_invalid_format() {
        let codec = FrameCodec::new();

        assert!(matches!(
            codec.decode("[1, 2, 3]").unwrap_err(),
            CodecError::InvalidFormat(_)
        ));
        assert!(matches!(
            codec.decode("hello").unwrap_err(),
            CodecError::InvalidFormat(_)
        ));
    }

    #[test]
    fn missing_type_field_is_invalid_format() {
        let codec = FrameCodec::new();
        let text = r#"{"data": {}, "timestamp": 1}"#;

        assert!(matches!(
            codec.decode(text).unwrap_err(),
            CodecError::InvalidFormat(_)
        ));
    }

    #[test]
    fn non_string_type_field_is_invalid_format() {
        let codec = FrameCodec::new();
        let text = r#"{"type": 7, "data": {}, "timestamp": 1}"#;

        assert!(matches!(
            codec.decode(text).unwrap_err(),
            CodecError::InvalidFormat(_)
        ));
    }

    #[test]
    fn missing_timestamp_is_a_json_error() {
        let codec = FrameCodec::new();
        let text = r#"{"type": "market", "data": {}}"#;

        assert!(matches!(
            codec.decode(text).unwrap_err(),
            CodecError::Json(_)
        ));
    }

    #[test]
    fn mismatched_payload_is_a_json_error() {
        let codec = FrameCodec::new();
        let text = r#"{
            "type": "arbitrage",
            "data": {"opportunity_id": "arb-1", "profit_percentage": "a lot"},
            "timestamp": 1
        }"#;

        assert!(matches!(
            codec.decode(text).unwrap_err(),
            CodecError::Json(_)
        ));
    }

    #[test]
    fn encodes_commands_to_parseable_json() {
        let codec = FrameCodec::new();

        let text = codec.encode(&Command::subscribe("SOL")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value, json!({"type": "subscribe", "data": {"token": "SOL"}}));
    }
}
