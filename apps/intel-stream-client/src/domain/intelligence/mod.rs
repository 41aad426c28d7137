//! Intelligence Message Types
//!
//! Core domain types for the intelligence stream: arbitrage opportunities,
//! social sentiment signals, risk alerts, and market overviews. These types
//! are transport-agnostic and represent the canonical internal form of a
//! decoded stream frame.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Message Tags
// =============================================================================

/// Tag identifying the kind of an intelligence frame.
///
/// Wire values are the lowercase tag names carried in the frame's `type`
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    /// Cross-exchange arbitrage opportunity updates.
    Arbitrage,
    /// Social sentiment signals.
    Social,
    /// Token risk alerts.
    Risk,
    /// Market overview snapshots.
    Market,
    /// Portfolio valuation updates.
    Portfolio,
}

impl MessageTag {
    /// Parse a wire tag string.
    ///
    /// Returns `None` for tags outside the known protocol set.
    #[must_use]
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "arbitrage" => Some(Self::Arbitrage),
            "social" => Some(Self::Social),
            "risk" => Some(Self::Risk),
            "market" => Some(Self::Market),
            "portfolio" => Some(Self::Portfolio),
            _ => None,
        }
    }

    /// Wire representation of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arbitrage => "arbitrage",
            Self::Social => "social",
            Self::Risk => "risk",
            Self::Market => "market",
            Self::Portfolio => "portfolio",
        }
    }
}

// =============================================================================
// Arbitrage
// =============================================================================

/// Lifecycle status of an arbitrage opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArbitrageStatus {
    /// Opportunity is live and executable.
    Active,
    /// Window has passed without execution.
    Expired,
    /// Opportunity was executed.
    Executed,
}

impl ArbitrageStatus {
    /// Whether the opportunity can still be acted on.
    #[must_use]
    pub const fn is_actionable(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Cross-exchange arbitrage opportunity update.
///
/// # Wire Format (JSON)
///
/// ```json
/// {
///   "opportunity_id": "arb-7f3a",
///   "token_symbol": "SOL",
///   "profit_percentage": 2.4,
///   "confidence": 0.87,
///   "execution_time": "2m",
///   "status": "active"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageUpdate {
    /// Stable identifier for the opportunity.
    pub opportunity_id: String,
    /// Symbol of the token the spread was found on.
    pub token_symbol: String,
    /// Expected profit as a percentage of notional.
    pub profit_percentage: f64,
    /// Model confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Human-readable estimate of the execution window.
    pub execution_time: String,
    /// Current lifecycle status.
    pub status: ArbitrageStatus,
}

// =============================================================================
// Social
// =============================================================================

/// Social sentiment signal for a token.
///
/// # Wire Format (JSON)
///
/// ```json
/// {
///   "signal_id": "soc-91c2",
///   "platform": "twitter",
///   "token": "BONK",
///   "sentiment_score": 0.62,
///   "hype_level": "rising",
///   "mentions_count": 1820,
///   "influence_score": 0.44
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialSignal {
    /// Stable identifier for the signal.
    pub signal_id: String,
    /// Platform the signal was derived from.
    pub platform: String,
    /// Token the signal refers to.
    pub token: String,
    /// Aggregate sentiment in `[-1.0, 1.0]`.
    pub sentiment_score: f64,
    /// Qualitative hype classification.
    pub hype_level: String,
    /// Mention count over the sampling window.
    pub mentions_count: u64,
    /// Weighted influence of the accounts involved.
    pub influence_score: f64,
}

// =============================================================================
// Risk
// =============================================================================

/// Severity of a risk alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Informational only.
    Low,
    /// Worth watching.
    Medium,
    /// Action recommended.
    High,
    /// Immediate action required.
    Critical,
}

impl RiskLevel {
    /// Whether the level warrants operator attention.
    #[must_use]
    pub const fn is_urgent(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Risk alert for a token contract.
///
/// # Wire Format (JSON)
///
/// ```json
/// {
///   "alert_id": "risk-04bd",
///   "token_address": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
///   "risk_level": "HIGH",
///   "risk_factors": ["liquidity_drain", "dev_wallet_activity"],
///   "confidence": 0.91,
///   "action_required": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    /// Stable identifier for the alert.
    pub alert_id: String,
    /// On-chain address of the affected token.
    pub token_address: String,
    /// Alert severity.
    pub risk_level: RiskLevel,
    /// Factors that triggered the alert.
    pub risk_factors: Vec<String>,
    /// Model confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Whether the producer recommends immediate action.
    pub action_required: bool,
}

// =============================================================================
// Frames
// =============================================================================

/// Decoded payload of an intelligence frame.
///
/// `market` and `portfolio` payloads have producer-defined shapes and are
/// carried as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum IntelPayload {
    /// Arbitrage opportunity update.
    Arbitrage(ArbitrageUpdate),
    /// Social sentiment signal.
    Social(SocialSignal),
    /// Risk alert.
    Risk(RiskAlert),
    /// Market overview snapshot.
    Market(serde_json::Value),
    /// Portfolio valuation update.
    Portfolio(serde_json::Value),
}

impl IntelPayload {
    /// Tag of this payload.
    #[must_use]
    pub const fn tag(&self) -> MessageTag {
        match self {
            Self::Arbitrage(_) => MessageTag::Arbitrage,
            Self::Social(_) => MessageTag::Social,
            Self::Risk(_) => MessageTag::Risk,
            Self::Market(_) => MessageTag::Market,
            Self::Portfolio(_) => MessageTag::Portfolio,
        }
    }
}

/// A decoded intelligence frame: payload plus producer timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct IntelFrame {
    /// Decoded payload.
    pub payload: IntelPayload,
    /// Producer timestamp in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl IntelFrame {
    /// Producer timestamp as a UTC datetime.
    ///
    /// Returns `None` when the raw value is outside chrono's representable
    /// range.
    #[must_use]
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

// =============================================================================
// Tests
// =============================================================================
