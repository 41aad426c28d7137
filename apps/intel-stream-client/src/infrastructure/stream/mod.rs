//! Intelligence Stream Adapter
//!
//! WebSocket client for the TradePulse intelligence stream:
//!
//! - **client**: connection supervisor, dispatch, keep-alive
//! - **codec**: tagged JSON frame encode/decode
//! - **messages**: wire envelope and outbound commands
//! - **reconnect**: linear backoff policy

pub mod client;
pub mod codec;
pub mod messages;
pub mod reconnect;

pub use client::{
    ConnectionState, IntelClient, IntelClientConfig, IntelClientError, StreamStatsSnapshot,
};
pub use codec::{CodecError, FrameCodec};
pub use messages::{Command, Envelope, TokenSelector};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
