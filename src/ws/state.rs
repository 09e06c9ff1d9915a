//! Connection state management for the telemetry client.

#![allow(clippy::redundant_pub_crate)]

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Connection state for the telemetry client.
///
/// `Idle` is entered once at construction and never re-entered. `Stopped`
/// is terminal: it is reached only through shutdown (or an exhausted retry
/// budget) and no transition leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Constructed, never started.
    Idle,
    /// Attempting to establish the connection.
    Connecting,
    /// Connection established; readings flow.
    Open,
    /// Connection dropped or errored; a retry may be pending.
    Closed,
    /// Backoff timer fired; about to connect again.
    Reconnecting,
    /// Shut down; all further operations are no-ops.
    Stopped,
}

impl ConnectionState {
    /// Returns true if the connection is established.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if the client is between connection attempts.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Connecting | Self::Reconnecting)
    }

    /// Returns true if the client has been shut down.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Closed => write!(f, "Closed"),
            Self::Reconnecting => write!(f, "Reconnecting"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Internal state tracking for the telemetry client.
///
/// Guards two invariants: the retry counter is zeroed on every `Open`
/// transition, and at most one reconnect timer is pending at a time.
#[derive(Debug)]
pub(crate) struct InternalState {
    /// Current connection state.
    pub state: ConnectionState,
    /// Number of reconnect timers that have fired since the last `Open`.
    pub reconnect_attempts: u32,
    /// Whether a reconnect timer is currently pending.
    pub reconnect_pending: bool,
    /// Whether the supervisor task has been spawned.
    pub running: bool,
    /// Last successful connection time.
    pub last_connected: Option<Instant>,
    /// Last accepted message time.
    pub last_message: Option<Instant>,
}

impl Default for InternalState {
    fn default() -> Self {
        Self {
            state: ConnectionState::Idle,
            reconnect_attempts: 0,
            reconnect_pending: false,
            running: false,
            last_connected: None,
            last_message: None,
        }
    }
}

impl InternalState {
    /// Creates a new internal state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once shutdown has been requested.
    pub fn is_stopped(&self) -> bool {
        self.state.is_stopped()
    }

    /// Marks the start of a connection attempt.
    pub fn mark_connecting(&mut self) {
        if !self.is_stopped() {
            self.state = ConnectionState::Connecting;
        }
    }

    /// Marks the connection as open, resetting the retry counter and
    /// clearing any pending-timer marker.
    pub fn mark_open(&mut self) {
        if self.is_stopped() {
            return;
        }
        self.state = ConnectionState::Open;
        self.reconnect_attempts = 0;
        self.reconnect_pending = false;
        self.last_connected = Some(Instant::now());
    }

    /// Marks the connection as dropped.
    pub fn mark_closed(&mut self) {
        if !self.is_stopped() {
            self.state = ConnectionState::Closed;
        }
    }

    /// Requests a reconnect timer.
    ///
    /// Returns false (no-op) if one is already pending or the client has
    /// been stopped; at most one timer is ever live per client.
    pub fn schedule_reconnect(&mut self) -> bool {
        if self.reconnect_pending || self.is_stopped() {
            return false;
        }
        self.reconnect_pending = true;
        true
    }

    /// Records that the pending reconnect timer fired: clears the marker
    /// and increments the retry counter.
    pub fn reconnect_timer_fired(&mut self) {
        if self.is_stopped() {
            return;
        }
        self.reconnect_pending = false;
        self.reconnect_attempts += 1;
        self.state = ConnectionState::Reconnecting;
    }

    /// Marks the client as stopped. Terminal; cancels the pending-timer
    /// marker so no further retries are observable.
    pub fn mark_stopped(&mut self) {
        self.state = ConnectionState::Stopped;
        self.reconnect_pending = false;
        self.running = false;
    }

    /// Records that a reading was accepted.
    pub fn record_message(&mut self) {
        self.last_message = Some(Instant::now());
    }
}
