//! Linear Reconnect Backoff
//!
//! Attempt accounting for the stream supervisor: attempt `n` waits
//! `n * base_delay`, a hard ceiling ends the ramp, and a successful
//! connect restarts it. Delays are deterministic; no jitter.

use std::time::Duration;

/// Tunables for the backoff ramp.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectConfig {
    /// Delay unit; attempt `n` waits `n * base_delay`.
    pub base_delay: Duration,
    /// Attempt ceiling; 0 disables it.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1000),
            max_attempts: 5,
        }
    }
}

impl ReconnectConfig {
    /// Build a config from explicit values.
    #[must_use]
    pub const fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }
}

/// Mutable attempt counter driving the ramp.
///
/// ```rust
/// use intel_stream_client::infrastructure::stream::reconnect::{ReconnectConfig, ReconnectPolicy};
/// use std::time::Duration;
///
/// let mut policy = ReconnectPolicy::new(ReconnectConfig::new(Duration::from_millis(500), 2));
/// assert_eq!(policy.next_delay(), Some(Duration::from_millis(500)));
/// assert_eq!(policy.next_delay(), Some(Duration::from_millis(1000)));
/// assert_eq!(policy.next_delay(), None); // ceiling reached
/// ```
#[derive(Debug)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    attempt_count: u32,
}

impl ReconnectPolicy {
    /// Start a fresh ramp at attempt 0.
    #[must_use]
    pub const fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempt_count: 0,
        }
    }

    /// Claim the next attempt and return its delay, or `None` when the
    /// ceiling has been used up.
    #[must_use]
    pub fn next_delay(&mut self) -> Option<Duration> {
        if !self.should_retry() {
            return None;
        }

        self.attempt_count += 1;
        Some(self.config.base_delay.saturating_mul(self.attempt_count))
    }

    /// Restart the ramp; called when a connection is established.
    pub const fn reset(&mut self) {
        self.attempt_count = 0;
    }

    /// Attempts claimed since the last reset.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// True while the ceiling leaves attempts to claim.
    #[must_use]
    pub const fn should_retry(&self) -> bool {
        self.config.max_attempts == 0 || self.attempt_count < self.config.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn defaults_match_stream_policy() {
        let config = ReconnectConfig::default();
        assert_eq!(config.base_delay, Duration::from_millis(1000));
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn ramp_is_linear_in_the_attempt_number() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::new(Duration::from_millis(250), 0));

        let delays: Vec<_> = (0..4).map(|_| policy.next_delay()).collect();
        assert_eq!(
            delays,
            [250, 500, 750, 1000]
                .map(|ms| Some(Duration::from_millis(ms)))
                .to_vec()
        );
    }

    #[test_case(1, 250; "first attempt waits one unit")]
    #[test_case(3, 750; "third attempt waits three units")]
    #[test_case(5, 1250; "fifth attempt waits five units")]
    fn delay_scales_with_attempt_number(attempt: u32, expected_ms: u64) {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::new(Duration::from_millis(250), 0));

        let mut delay = None;
        for _ in 0..attempt {
            delay = policy.next_delay();
        }

        assert_eq!(delay, Some(Duration::from_millis(expected_ms)));
    }

    #[test]
    fn ceiling_ends_the_ramp() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::new(Duration::from_millis(100), 3));

        for expected in 1..=3 {
            assert!(policy.next_delay().is_some());
            assert_eq!(policy.attempt_count(), expected);
        }

        assert!(policy.next_delay().is_none());
        assert!(!policy.should_retry());
        // Exhaustion is sticky until a reset
        assert!(policy.next_delay().is_none());
    }

    #[test]
    fn default_ceiling_is_five() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::default());

        for _ in 0..5 {
            assert!(policy.next_delay().is_some());
        }
        assert!(policy.next_delay().is_none());
    }

    #[test]
    fn reset_restarts_the_ramp() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::new(Duration::from_millis(100), 3));

        let _ = policy.next_delay();
        let _ = policy.next_delay();
        assert_eq!(policy.attempt_count(), 2);

        policy.reset();

        assert_eq!(policy.attempt_count(), 0);
        assert!(policy.should_retry());
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn zero_ceiling_never_exhausts() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::new(Duration::from_millis(1), 0));

        for _ in 0..1000 {
            assert!(policy.should_retry());
            assert!(policy.next_delay().is_some());
        }
    }
}
