//! Intelligence Stream WebSocket Client
//!
//! Maintains the single realtime connection to the TradePulse intelligence
//! stream. The client connects as soon as it is constructed, decodes tagged
//! JSON frames into typed updates, dispatches them to registered handlers,
//! sends application-level keep-alive pings, and reconnects with linear
//! backoff when the transport drops.
//!
//! # Protocol
//!
//! Every frame, inbound or outbound, is a single JSON object tagged by a
//! `type` field. Inbound tags: `arbitrage`, `social`, `risk`, `market`,
//! `portfolio`. Outbound commands: `subscribe`, `unsubscribe`,
//! `request_arbitrage`, `ping`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::domain::dispatch::{DispatchOutcome, HandlerRegistry};
use crate::domain::intelligence::{ArbitrageUpdate, RiskAlert, SocialSignal};
use crate::infrastructure::metrics::{self, DropReason};

use super::codec::{CodecError, FrameCodec};
use super::messages::Command;
use super::reconnect::{ReconnectConfig, ReconnectPolicy};

/// Default interval between application-level keep-alive pings.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur in the intelligence stream client.
#[derive(Debug, thiserror::Error)]
pub enum IntelClientError {
    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Maximum reconnection attempts exceeded.
    #[error("maximum reconnection attempts exceeded")]
    MaxReconnectAttemptsExceeded,

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,
}

// =============================================================================
// Connection State
// =============================================================================

/// Connection lifecycle state of the intelligence stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport open and no dial in flight.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The WebSocket is open and frames are flowing.
    Connected,
}

impl ConnectionState {
    /// Whether the stream is currently connected.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Lowercase name, for logging and health reporting.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the intelligence stream client.
#[derive(Debug, Clone)]
pub struct IntelClientConfig {
    /// WebSocket URL of the intelligence stream.
    pub url: String,
    /// Interval between application-level keep-alive pings.
    pub keepalive_interval: Duration,
    /// Reconnection backoff settings.
    pub reconnect: ReconnectConfig,
}

impl IntelClientConfig {
    /// Create a configuration with default keep-alive and reconnect
    /// settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            reconnect: ReconnectConfig::default(),
        }
    }
}

// =============================================================================
// Stream Statistics
// =============================================================================

/// Lifetime counters for the stream connection.
#[derive(Debug, Default)]
struct StreamStats {
    messages_received: AtomicU64,
    messages_dropped: AtomicU64,
    commands_sent: AtomicU64,
    reconnects: AtomicU64,
}

impl StreamStats {
    fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_command(&self) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> StreamStatsSnapshot {
        StreamStatsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the stream counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStatsSnapshot {
    /// Frames decoded successfully since startup.
    pub messages_received: u64,
    /// Frames dropped (malformed, unknown tag, or no handler).
    pub messages_dropped: u64,
    /// Commands written to the socket, including keep-alive pings.
    pub commands_sent: u64,
    /// Reconnect attempts scheduled.
    pub reconnects: u64,
}

// =============================================================================
// Client
// =============================================================================

/// Handle to the intelligence stream connection.
///
/// Construction spawns the connection supervisor, which dials immediately;
/// there is no lazy mode. The connection is a process-lifetime resource:
/// handles are cheap clones sharing one connection, and dropping them never
/// closes it. Only [`IntelClient::disconnect`] (or cancelling the token
/// passed to [`IntelClient::new`]) tears the connection down.
#[derive(Clone)]
pub struct IntelClient {
    inner: Arc<ClientInner>,
    cancel: CancellationToken,
}

struct ClientInner {
    config: IntelClientConfig,
    codec: FrameCodec,
    handlers: HandlerRegistry,
    state_tx: watch::Sender<ConnectionState>,
    outbound: parking_lot::RwLock<Option<mpsc::UnboundedSender<Command>>>,
    stats: StreamStats,
}

impl IntelClient {
    /// Create the client and start connecting.
    ///
    /// Cancelling `cancel` is equivalent to calling
    /// [`IntelClient::disconnect`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn new(config: IntelClientConfig, cancel: CancellationToken) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let inner = Arc::new(ClientInner {
            config,
            codec: FrameCodec::new(),
            handlers: HandlerRegistry::new(),
            state_tx,
            outbound: parking_lot::RwLock::new(None),
            stats: StreamStats::default(),
        });

        let task_inner = Arc::clone(&inner);
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = task_inner.supervise(task_cancel).await {
                tracing::error!(error = %e, "Intelligence stream client error");
            }
        });

        Self { inner, cancel }
    }

    /// Register the arbitrage handler, replacing any previous one.
    pub fn on_arbitrage(
        &self,
        handler: impl Fn(ArbitrageUpdate, i64) + Send + Sync + 'static,
    ) -> &Self {
        self.inner.handlers.set_arbitrage(handler);
        self
    }

    /// Register the social-signal handler, replacing any previous one.
    pub fn on_social(&self, handler: impl Fn(SocialSignal, i64) + Send + Sync + 'static) -> &Self {
        self.inner.handlers.set_social(handler);
        self
    }

    /// Register the risk-alert handler, replacing any previous one.
    pub fn on_risk(&self, handler: impl Fn(RiskAlert, i64) + Send + Sync + 'static) -> &Self {
        self.inner.handlers.set_risk(handler);
        self
    }

    /// Register the market-overview handler, replacing any previous one.
    pub fn on_market(
        &self,
        handler: impl Fn(serde_json::Value, i64) + Send + Sync + 'static,
    ) -> &Self {
        self.inner.handlers.set_market(handler);
        self
    }

    /// Register the connection-state handler, replacing any previous one.
    ///
    /// The handler fires with `true` each time the stream becomes
    /// connected and with `false` each time an established connection
    /// ends. Failed connection attempts do not fire it.
    pub fn on_connection(&self, handler: impl Fn(bool) + Send + Sync + 'static) -> &Self {
        self.inner.handlers.set_connection(handler);
        self
    }

    /// Ask the stream for updates scoped to a token.
    ///
    /// Silently does nothing while disconnected; commands are not queued.
    pub fn subscribe_to_token(&self, token: impl Into<String>) {
        self.inner.send_command(Command::subscribe(token));
    }

    /// Stop updates scoped to a token.
    ///
    /// Silently does nothing while disconnected; commands are not queued.
    pub fn unsubscribe_from_token(&self, token: impl Into<String>) {
        self.inner.send_command(Command::unsubscribe(token));
    }

    /// Request an immediate arbitrage snapshot.
    ///
    /// Silently does nothing while disconnected; commands are not queued.
    pub fn request_arbitrage_update(&self) {
        self.inner.send_command(Command::RequestArbitrage);
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    /// Whether the stream is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Watch connection-state transitions.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Point-in-time copy of the stream counters.
    #[must_use]
    pub fn stats(&self) -> StreamStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Close the connection and stop reconnecting.
    ///
    /// Cancels any pending reconnect and the keep-alive timer. Idempotent;
    /// the client does not reconnect afterwards.
    pub fn disconnect(&self) {
        self.cancel.cancel();
    }
}

impl ClientInner {
    /// Run the connection supervisor until cancelled or retries are
    /// exhausted.
    async fn supervise(
        self: Arc<Self>,
        cancel: CancellationToken,
    ) -> Result<(), IntelClientError> {
        let mut policy = ReconnectPolicy::new(self.config.reconnect);

        loop {
            if cancel.is_cancelled() {
                tracing::info!("Intelligence stream client cancelled");
                self.transition(ConnectionState::Disconnected);
                return Ok(());
            }

            match self.run_session(&cancel, &mut policy).await {
                Ok(()) => {
                    tracing::info!("Intelligence stream closed on request");
                    self.transition(ConnectionState::Disconnected);
                    return Ok(());
                }
                Err(e) => {
                    self.transition(ConnectionState::Disconnected);

                    if cancel.is_cancelled() {
                        return Ok(());
                    }

                    if let Some(delay) = policy.next_delay() {
                        let attempt = policy.attempt_count();
                        self.stats.record_reconnect();
                        metrics::record_reconnect();
                        tracing::warn!(
                            error = %e,
                            attempt,
                            delay_ms = delay.as_millis(),
                            "Intelligence stream connection lost, reconnecting"
                        );

                        tokio::select! {
                            () = cancel.cancelled() => {
                                tracing::info!("Cancelled during reconnect delay");
                                return Ok(());
                            }
                            () = tokio::time::sleep(delay) => {}
                        }
                    } else {
                        tracing::error!(
                            error = %e,
                            attempts = policy.attempt_count(),
                            "Reconnect attempts exhausted, giving up"
                        );
                        return Err(IntelClientError::MaxReconnectAttemptsExceeded);
                    }
                }
            }
        }
    }

    /// Dial the stream and process frames until the connection ends.
    ///
    /// Returns `Ok(())` only when cancelled; every other exit is an error
    /// the supervisor treats as an involuntary disconnect.
    async fn run_session(
        &self,
        cancel: &CancellationToken,
        policy: &mut ReconnectPolicy,
    ) -> Result<(), IntelClientError> {
        self.transition(ConnectionState::Connecting);
        tracing::info!(url = %self.config.url, "Connecting to intelligence stream");

        let (ws_stream, _response) = tokio_tungstenite::connect_async(&self.config.url).await?;
        policy.reset();

        let (mut write, mut read) = ws_stream.split();

        // Install the outbound sender before announcing the connection so
        // handlers reacting to the notification can issue commands.
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        *self.outbound.write() = Some(outbound_tx);

        self.transition(ConnectionState::Connected);
        metrics::set_connected(true);
        self.handlers.notify_connection(true);
        tracing::info!("Intelligence stream connected");

        let mut keepalive = interval_at(
            Instant::now() + self.config.keepalive_interval,
            self.config.keepalive_interval,
        );
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let result = loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    break Ok(());
                }
                _ = keepalive.tick() => {
                    if let Err(e) = self.send_text(&mut write, &Command::Ping).await {
                        break Err(e);
                    }
                }
                maybe_command = outbound_rx.recv() => {
                    if let Some(command) = maybe_command {
                        if let Err(e) = self.send_text(&mut write, &command).await {
                            break Err(e);
                        }
                    }
                }
                message = read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_frame(text.as_str());
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = write.send(Message::Pong(data)).await {
                                break Err(e.into());
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Server sent close frame");
                            break Err(IntelClientError::ConnectionClosed);
                        }
                        Some(Ok(_)) => {
                            // Ignore other message types
                        }
                        Some(Err(e)) => {
                            break Err(e.into());
                        }
                        None => {
                            tracing::info!("WebSocket stream ended");
                            break Err(IntelClientError::ConnectionClosed);
                        }
                    }
                }
            }
        };

        // The established connection is over: retract send access first,
        // then report the downward edge exactly once.
        *self.outbound.write() = None;
        self.transition(ConnectionState::Disconnected);
        metrics::set_connected(false);
        self.handlers.notify_connection(false);

        result
    }

    /// Encode and write one command to the socket.
    async fn send_text(
        &self,
        write: &mut WsSink,
        command: &Command,
    ) -> Result<(), IntelClientError> {
        let text = self.codec.encode(command)?;
        write.send(Message::Text(text.into())).await?;

        self.stats.record_command();
        metrics::record_command_sent(command.kind());
        tracing::debug!(command = command.kind(), "Command sent");

        Ok(())
    }

    /// Decode one inbound text frame and dispatch it.
    ///
    /// Decode and dispatch failures are confined to the frame; they never
    /// end the session.
    fn handle_frame(&self, text: &str) {
        match self.codec.decode(text) {
            Ok(frame) => {
                let tag = frame.payload.tag();
                self.stats.record_received();
                metrics::record_message_received(tag.as_str());

                match self.handlers.dispatch(frame) {
                    DispatchOutcome::Delivered => {
                        tracing::trace!(tag = tag.as_str(), "Frame dispatched");
                    }
                    DispatchOutcome::NoHandler => {
                        self.stats.record_dropped();
                        metrics::record_message_dropped(DropReason::NoHandler);
                        tracing::debug!(tag = tag.as_str(), "No handler registered, frame dropped");
                    }
                }
            }
            Err(CodecError::UnknownTag(tag)) => {
                self.stats.record_dropped();
                metrics::record_message_dropped(DropReason::UnknownTag);
                tracing::debug!(tag = %tag, "Unknown frame tag, frame dropped");
            }
            Err(e) => {
                self.stats.record_dropped();
                metrics::record_message_dropped(DropReason::Malformed);
                tracing::warn!(error = %e, "Malformed frame dropped");
            }
        }
    }

    /// Forward a command to the active session, or drop it when there is
    /// none.
    fn send_command(&self, command: Command) {
        let guard = self.outbound.read();
        match guard.as_ref() {
            Some(tx) => {
                // A send failure means the session ended between the slot
                // check and now; the command is dropped like any other
                // disconnected send.
                if tx.send(command).is_err() {
                    tracing::debug!("Session ended, outbound command dropped");
                }
            }
            None => {
                tracing::debug!(
                    command = command.kind(),
                    "Not connected, outbound command dropped"
                );
            }
        }
    }

    /// Publish a connection-state change if it differs from the current
    /// state.
    fn transition(&self, next: ConnectionState) {
        let changed = self.state_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });

        if changed {
            tracing::debug!(state = next.as_str(), "Connection state changed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
