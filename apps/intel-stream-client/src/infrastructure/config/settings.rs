//! Client Configuration Settings
//!
//! Configuration types for the intelligence stream client, loaded from
//! environment variables. Every variable has a default; nothing is
//! required to start against the local stack.

use std::time::Duration;

/// Production intelligence stream endpoint.
pub const PRODUCTION_STREAM_URL: &str = "wss://intel.tradepulse.app/ws/intelligence";

/// Local development intelligence stream endpoint.
pub const LOCAL_STREAM_URL: &str = "ws://127.0.0.1:8765/ws/intelligence";

const DEFAULT_KEEPALIVE_SECS: u64 = 30;
const DEFAULT_RECONNECT_BASE_MS: u64 = 1_000;
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_HEALTH_PORT: u16 = 8090;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development against the dev stack.
    #[default]
    Local,
    /// Production deployment.
    Production,
}

impl Environment {
    /// Case-insensitive parse; anything unrecognized maps to local.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PRODUCTION" | "PROD" => Self::Production,
            _ => Self::Local,
        }
    }

    /// Whether this is the production environment.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
        }
    }

    /// Stream endpoint this environment dials by default.
    #[must_use]
    pub const fn stream_url(self) -> &'static str {
        match self {
            Self::Local => LOCAL_STREAM_URL,
            Self::Production => PRODUCTION_STREAM_URL,
        }
    }
}

/// Intelligence stream connection settings.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Explicit stream URL, overriding the environment default.
    pub url_override: Option<String>,
    /// Interval between application-level keep-alive pings.
    pub keepalive_interval: Duration,
    /// Delay unit for linear reconnect backoff.
    pub reconnect_base_delay: Duration,
    /// Reconnect attempt ceiling; 0 retries forever.
    pub max_reconnect_attempts: u32,
    /// Tokens to subscribe to whenever the stream connects.
    pub watch_tokens: Vec<String>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            url_override: None,
            keepalive_interval: Duration::from_secs(DEFAULT_KEEPALIVE_SECS),
            reconnect_base_delay: Duration::from_millis(DEFAULT_RECONNECT_BASE_MS),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            watch_tokens: Vec::new(),
        }
    }
}

/// Ports the process listens on.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Health check HTTP port.
    pub health_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            health_port: DEFAULT_HEALTH_PORT,
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Deployment environment.
    pub environment: Environment,
    /// Intelligence stream connection settings.
    pub stream: StreamSettings,
    /// Ports the process listens on.
    pub server: ServerSettings,
}

impl AppConfig {
    /// Assemble configuration from the process environment.
    ///
    /// Unparseable numeric variables silently keep their defaults; a bad
    /// `INTEL_STREAM_URL` is the one hard failure.
    ///
    /// # Errors
    ///
    /// Returns an error if `INTEL_STREAM_URL` is set but empty or not a
    /// WebSocket URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = std::env::var("TRADEPULSE_ENV")
            .map(|s| Environment::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let url_override = match std::env::var("INTEL_STREAM_URL") {
            Ok(url) => Some(validate_stream_url(url)?),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            stream: StreamSettings {
                url_override,
                keepalive_interval: Duration::from_secs(parse_env(
                    "INTEL_STREAM_KEEPALIVE_INTERVAL_SECS",
                    DEFAULT_KEEPALIVE_SECS,
                )),
                reconnect_base_delay: Duration::from_millis(parse_env(
                    "INTEL_STREAM_RECONNECT_BASE_DELAY_MS",
                    DEFAULT_RECONNECT_BASE_MS,
                )),
                max_reconnect_attempts: parse_env(
                    "INTEL_STREAM_MAX_RECONNECT_ATTEMPTS",
                    DEFAULT_MAX_RECONNECT_ATTEMPTS,
                ),
                watch_tokens: parse_env_list("INTEL_STREAM_WATCH_TOKENS"),
            },
            server: ServerSettings {
                health_port: parse_env("INTEL_STREAM_HEALTH_PORT", DEFAULT_HEALTH_PORT),
            },
        })
    }

    /// The intelligence stream WebSocket URL.
    ///
    /// An explicit `INTEL_STREAM_URL` override wins; otherwise the URL
    /// follows the deployment environment.
    #[must_use]
    pub fn intelligence_stream_url(&self) -> String {
        self.stream
            .url_override
            .clone()
            .unwrap_or_else(|| self.environment.stream_url().to_string())
    }
}

/// Configuration rejected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable was set to an empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable carried an unusable value.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

fn validate_stream_url(url: String) -> Result<String, ConfigError> {
    if url.trim().is_empty() {
        return Err(ConfigError::EmptyValue("INTEL_STREAM_URL".to_string()));
    }

    if !url.starts_with("ws://") && !url.starts_with("wss://") {
        return Err(ConfigError::InvalidValue {
            key: "INTEL_STREAM_URL".to_string(),
            reason: "must start with ws:// or wss://".to_string(),
        });
    }

    Ok(url)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn parse_env_list(key: &str) -> Vec<String> {
    std::env::var(key).map_or_else(
        |_| Vec::new(),
        |v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        },
    )
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("production", Environment::Production; "lowercase production")]
    #[test_case("PRODUCTION", Environment::Production; "uppercase production")]
    #[test_case("prod", Environment::Production; "short form")]
    #[test_case("local", Environment::Local; "lowercase local")]
    #[test_case("LOCAL", Environment::Local; "uppercase local")]
    #[test_case("unknown", Environment::Local; "unrecognized falls back to local")]
    fn environment_parsing(input: &str, expected: Environment) {
        assert_eq!(Environment::from_str_case_insensitive(input), expected);
    }

    #[test]
    fn environment_is_production() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Local.is_production());
    }

    #[test]
    fn environment_default_urls() {
        assert_eq!(Environment::Production.stream_url(), PRODUCTION_STREAM_URL);
        assert_eq!(Environment::Local.stream_url(), LOCAL_STREAM_URL);
    }

    #[test]
    fn stream_settings_defaults() {
        let settings = StreamSettings::default();
        assert_eq!(settings.url_override, None);
        assert_eq!(settings.keepalive_interval, Duration::from_secs(30));
        assert_eq!(settings.reconnect_base_delay, Duration::from_millis(1000));
        assert_eq!(settings.max_reconnect_attempts, 5);
        assert!(settings.watch_tokens.is_empty());
    }

    #[test]
    fn server_settings_defaults() {
        assert_eq!(ServerSettings::default().health_port, 8090);
    }

    #[test]
    fn stream_url_follows_environment() {
        let config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        assert_eq!(config.intelligence_stream_url(), PRODUCTION_STREAM_URL);

        let config = AppConfig::default();
        assert_eq!(config.intelligence_stream_url(), LOCAL_STREAM_URL);
    }

    #[test]
    fn stream_url_override_wins() {
        let mut config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        config.stream.url_override = Some("ws://10.0.0.5:9000/ws/intelligence".to_string());

        assert_eq!(
            config.intelligence_stream_url(),
            "ws://10.0.0.5:9000/ws/intelligence"
        );
    }

    #[test]
    fn url_validation_accepts_websocket_schemes() {
        assert!(validate_stream_url("ws://localhost:8765/ws".to_string()).is_ok());
        assert!(validate_stream_url("wss://intel.tradepulse.app/ws".to_string()).is_ok());
    }

    #[test]
    fn url_validation_rejects_empty() {
        assert!(matches!(
            validate_stream_url("   ".to_string()),
            Err(ConfigError::EmptyValue(_))
        ));
    }

    #[test]
    fn url_validation_rejects_non_websocket_schemes() {
        assert!(matches!(
            validate_stream_url("https://intel.tradepulse.app/ws".to_string()),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
