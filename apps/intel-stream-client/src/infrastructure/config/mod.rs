//! Configuration Module
//!
//! Configuration loading for the intelligence stream client.

mod settings;

pub use settings::{
    AppConfig, ConfigError, Environment, LOCAL_STREAM_URL, PRODUCTION_STREAM_URL, ServerSettings,
    StreamSettings,
};
