//! Reconnecting telemetry client.
//!
//! One `TelemetryClient` owns one logical socket: it establishes the
//! connection, feeds every accepted reading to the host callback, and
//! recovers from drops with capped exponential backoff. Establishment
//! failures never propagate to the host; they are logged and converted
//! into a scheduled retry.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::protocol::Message as TungsteniteMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::error::{ConfigError, DataError, NetworkError};
use crate::types::{Percent, Reading};

use super::config::FeedConfig;
use super::state::{ConnectionState, InternalState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, TungsteniteMessage>;
type WsSource = SplitStream<WsStream>;

/// Extracts a numeric reading from a raw inbound payload.
///
/// Implementations return `None` for malformed or irrelevant messages;
/// such messages are logged and discarded without affecting the
/// connection. Implementations must not panic. Returned values are
/// clamped into `[0, 100]` by the client, so decoders pass wire values
/// through unmodified.
pub trait TelemetryDecoder: Send + Sync {
    /// Decodes a text payload into a raw reading value.
    fn decode(&self, payload: &str) -> Option<f64>;
}

/// Callback trait for telemetry client events.
///
/// Only `on_reading` is required; lifecycle notifications default to
/// no-ops. Nothing a callback does may panic across the boundary - the
/// client treats callbacks as infallible.
#[async_trait]
pub trait TelemetryCallback: Send + Sync {
    /// Called with every accepted, clamped reading.
    async fn on_reading(&self, reading: Reading);

    /// Called when the connection is established.
    async fn on_connected(&self) {}

    /// Called when the connection is lost.
    async fn on_disconnected(&self, reason: Option<String>) {
        let _ = reason;
    }

    /// Called when a transport error occurs.
    async fn on_error(&self, error: NetworkError) {
        let _ = error;
    }

    /// Called when a reconnect timer is scheduled.
    async fn on_reconnecting(&self, attempt: u32, delay: Duration) {
        let _ = (attempt, delay);
    }
}

/// State shared between the client handle and its supervisor task.
struct Shared {
    config: FeedConfig,
    decoder: Arc<dyn TelemetryDecoder>,
    callback: Arc<dyn TelemetryCallback>,
    state: RwLock<InternalState>,
    last_reading: RwLock<Option<Reading>>,
    send_tx: RwLock<Option<mpsc::Sender<String>>>,
}

/// Reconnecting telemetry ingestion client.
///
/// # Features
///
/// - Automatic reconnection with capped exponential backoff
/// - At most one pending reconnect timer per client instance
/// - Last-value reading cache, retained as stale data across disconnects
/// - Idempotent, re-entrant-safe shutdown
///
/// # Example
///
/// ```ignore
/// use hydrolink::ws::{FeedConfig, TelemetryClient};
///
/// let config = FeedConfig::builder()
///     .url("ws://controller.local:8000/ws/tanklevel")
///     .feed("tank")
///     .build();
///
/// let client = TelemetryClient::new(config, decoder, callback)?;
/// client.start();
/// ```
pub struct TelemetryClient {
    shared: Arc<Shared>,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
}

impl TelemetryClient {
    /// Creates a new telemetry client.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEndpoint` if the configured URL does
    /// not carry a WebSocket scheme.
    pub fn new(
        config: FeedConfig,
        decoder: Arc<dyn TelemetryDecoder>,
        callback: Arc<dyn TelemetryCallback>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                decoder,
                callback,
                state: RwLock::new(InternalState::new()),
                last_reading: RwLock::new(None),
                send_tx: RwLock::new(None),
            }),
            shutdown_tx: Mutex::new(None),
        })
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state.read().state
    }

    /// Returns whether the connection is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Returns the number of reconnect timers fired since the last
    /// successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.state.read().reconnect_attempts
    }

    /// Returns whether a reconnect timer is currently pending.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.shared.state.read().reconnect_pending
    }

    /// Returns the most recent accepted reading, if any.
    ///
    /// Retained across disconnects; stale data is the only host-visible
    /// failure signal.
    #[must_use]
    pub fn last_reading(&self) -> Option<Reading> {
        *self.shared.last_reading.read()
    }

    /// Starts the client. Idempotent: a no-op while already running or
    /// after shutdown.
    ///
    /// Must be called from within a tokio runtime; connection failures are
    /// absorbed into the reconnect schedule and never surface here.
    pub fn start(&self) {
        {
            let mut st = self.shared.state.write();
            if st.running || st.is_stopped() {
                return;
            }
            st.running = true;
            st.mark_connecting();
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        *self.shutdown_tx.lock() = Some(shutdown_tx);

        tokio::spawn(run_loop(Arc::clone(&self.shared), shutdown_rx));
    }

    /// Shuts the client down. Idempotent and callable from any state,
    /// including from inside one of this client's own callbacks.
    ///
    /// Cancels any pending reconnect timer, closes the socket if open
    /// (close errors are swallowed), and parks the client in `Stopped`;
    /// no callback fires afterwards.
    pub async fn shutdown(&self) {
        let tx = self.shutdown_tx.lock().take();
        if let Some(tx) = tx {
            // Ignored when the supervisor already exited.
            let _ = tx.send(()).await;
        }
        self.shared.state.write().mark_stopped();
    }

    /// Sends a text message if the connection is open.
    ///
    /// Returns false when the message was dropped because the connection
    /// is not open; the host decides whether to surface that.
    pub fn try_send_text(&self, text: impl Into<String>) -> bool {
        if !self.is_connected() {
            debug!(feed = %self.shared.config.feed, "send dropped: not connected");
            return false;
        }
        let guard = self.shared.send_tx.read();
        match guard.as_ref() {
            Some(tx) => tx.try_send(text.into()).is_ok(),
            None => false,
        }
    }

    /// Serializes a value to JSON and sends it if the connection is open.
    ///
    /// # Errors
    ///
    /// Returns `DataError::Encode` if serialization fails; an unreachable
    /// connection is reported through the `false` return instead.
    pub fn try_send_json<T: Serialize>(&self, value: &T) -> Result<bool, DataError> {
        let json = serde_json::to_string(value).map_err(|e| DataError::Encode {
            reason: e.to_string(),
        })?;
        Ok(self.try_send_text(json))
    }
}

/// Supervisor loop: one connection attempt per iteration, with a single
/// backoff timer between failed iterations.
async fn run_loop(shared: Arc<Shared>, mut shutdown_rx: mpsc::Receiver<()>) {
    loop {
        shared.state.write().mark_connecting();
        debug!(feed = %shared.config.feed, url = %shared.config.url, "connecting");

        let attempt = tokio::select! {
            _ = shutdown_rx.recv() => {
                shared.state.write().mark_stopped();
                return;
            }
            result = timeout(
                shared.config.connect_timeout(),
                connect_async(shared.config.url.as_str()),
            ) => result,
        };

        match attempt {
            Ok(Ok((stream, _response))) => {
                shared.state.write().mark_open();
                info!(
                    feed = %shared.config.feed,
                    url = %shared.config.url,
                    "feed connected"
                );
                shared.callback.on_connected().await;

                let (send_tx, send_rx) = mpsc::channel::<String>(32);
                *shared.send_tx.write() = Some(send_tx);

                let outcome = run_connection(&shared, stream, send_rx, &mut shutdown_rx).await;

                *shared.send_tx.write() = None;
                match outcome {
                    ConnectionOutcome::Shutdown => {
                        shared.state.write().mark_stopped();
                        return;
                    }
                    ConnectionOutcome::Dropped(reason) => {
                        shared.state.write().mark_closed();
                        warn!(
                            feed = %shared.config.feed,
                            reason = ?reason,
                            "feed disconnected"
                        );
                        shared.callback.on_disconnected(reason).await;
                    }
                }
            }
            Ok(Err(e)) => {
                let err = NetworkError::ConnectionFailed {
                    reason: e.to_string(),
                };
                shared.state.write().mark_closed();
                warn!(feed = %shared.config.feed, error = %err, "connect failed");
                shared.callback.on_error(err).await;
            }
            Err(_elapsed) => {
                let err = NetworkError::Timeout {
                    timeout_ms: shared.config.connect_timeout_ms,
                };
                shared.state.write().mark_closed();
                warn!(feed = %shared.config.feed, error = %err, "connect timed out");
                shared.callback.on_error(err).await;
            }
        }

        // Schedule the (single) reconnect timer. The delay uses the
        // attempt count before increment; the counter advances when the
        // timer fires.
        let (next_attempt, delay) = {
            let mut st = shared.state.write();
            if st.is_stopped() {
                return;
            }
            if !shared.config.should_reconnect(st.reconnect_attempts) {
                error!(
                    feed = %shared.config.feed,
                    attempts = st.reconnect_attempts,
                    "reconnect budget exhausted, giving up"
                );
                st.mark_stopped();
                return;
            }
            if !st.schedule_reconnect() {
                return;
            }
            let delay = shared.config.reconnect_delay_for(st.reconnect_attempts);
            (st.reconnect_attempts + 1, delay)
        };

        info!(
            feed = %shared.config.feed,
            attempt = next_attempt,
            delay_ms = delay.as_millis() as u64,
            "reconnecting after backoff"
        );
        shared.callback.on_reconnecting(next_attempt, delay).await;

        tokio::select! {
            _ = shutdown_rx.recv() => {
                shared.state.write().mark_stopped();
                return;
            }
            () = sleep(delay) => {
                shared.state.write().reconnect_timer_fired();
            }
        }
    }
}

enum ConnectionOutcome {
    /// Shutdown was requested; the supervisor must exit.
    Shutdown,
    /// The transport dropped; the supervisor schedules a retry.
    Dropped(Option<String>),
}

/// Drives one established connection until it drops or shutdown arrives.
async fn run_connection(
    shared: &Shared,
    stream: WsStream,
    mut send_rx: mpsc::Receiver<String>,
    shutdown_rx: &mut mpsc::Receiver<()>,
) -> ConnectionOutcome {
    let (mut sink, mut source): (WsSink, WsSource) = stream.split();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                // Close errors are swallowed; the socket is going away
                // either way.
                let _ = sink.close().await;
                return ConnectionOutcome::Shutdown;
            }

            Some(text) = send_rx.recv() => {
                if let Err(e) = sink.send(TungsteniteMessage::Text(text)).await {
                    let err = NetworkError::from_ws(&e);
                    warn!(feed = %shared.config.feed, error = %err, "send failed");
                    shared.callback.on_error(err).await;
                }
            }

            next = source.next() => {
                match next {
                    Some(Ok(TungsteniteMessage::Text(text))) => {
                        handle_payload(shared, &text).await;
                    }
                    Some(Ok(TungsteniteMessage::Ping(data))) => {
                        if let Err(e) = sink.send(TungsteniteMessage::Pong(data)).await {
                            warn!(feed = %shared.config.feed, error = %e, "pong failed");
                        }
                    }
                    Some(Ok(TungsteniteMessage::Pong(_))) => {}
                    Some(Ok(TungsteniteMessage::Close(frame))) => {
                        let reason = frame.map(|f| f.reason.to_string());
                        let _ = sink.close().await;
                        return ConnectionOutcome::Dropped(reason);
                    }
                    Some(Ok(_)) => {
                        debug!(feed = %shared.config.feed, "ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        let err = NetworkError::from_ws(&e);
                        // Defensive close; its own errors are swallowed.
                        let _ = sink.close().await;
                        shared.callback.on_error(err.clone()).await;
                        return ConnectionOutcome::Dropped(Some(err.to_string()));
                    }
                    None => {
                        return ConnectionOutcome::Dropped(None);
                    }
                }
            }
        }
    }
}

/// Decodes one payload; on success clamps, caches, and notifies.
async fn handle_payload(shared: &Shared, text: &str) {
    match shared.decoder.decode(text) {
        Some(raw) => {
            let reading = Reading::now(Percent::clamped(raw));
            {
                let mut st = shared.state.write();
                if st.is_stopped() {
                    return;
                }
                st.record_message();
                *shared.last_reading.write() = Some(reading);
            }
            shared.callback.on_reading(reading).await;
        }
        None => {
            debug!(feed = %shared.config.feed, payload = %text, "payload ignored");
        }
    }
}
