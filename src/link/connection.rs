//! Duplex channel lifecycle.
//!
//! ```text
//!                connect()                 Opened
//!  Disconnected ──────────▶ Connecting ─────────────▶ Connected
//!       ▲                    │     ▲                     │
//!       │ close()            │     │ delay elapsed       │ Closed / Error /
//!       │ (from any state)   │     │                     │ send failure
//!       │                    ▼     │                     ▼
//!       └──────────────── Reconnecting ◀─────────────────┘
//!                open error / Closed before Opened
//! ```
//!
//! The manager is the only writer of [`LinkState`].  Retries are unbounded
//! with a fixed delay.  Time is passed in as `now_ms` so the reconnect
//! timer is deterministic under test.  `send` has no clock, so a send
//! failure leaves the deadline pending and the next `poll` starts the delay
//! from its own `now_ms`.
//!
//! Transitions and inbound frames are queued as [`LinkSignal`]s and drained
//! by the owner in FIFO order, so every signal is delivered exactly once and
//! in the order it happened.

use core::fmt;
use std::collections::VecDeque;

use log::{debug, info, warn};

use super::transport::{Transport, TransportEvent};
use crate::error::LinkError;

// ───────────────────────────────────────────────────────────────
// State
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl LinkState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of the manager, drained by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSignal {
    StateChanged { from: LinkState, to: LinkState },
    /// Raw inbound frame, not yet decoded.
    Frame(String),
}

/// Write side of the link as seen by the dispatcher and pollers.
pub trait FrameSink {
    fn link_state(&self) -> LinkState;

    /// Hand one encoded frame to the channel.
    fn send_frame(&mut self, text: &str) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Manager
// ───────────────────────────────────────────────────────────────

pub struct ConnectionManager<T: Transport> {
    transport: T,
    state: LinkState,
    url: String,
    reconnect_delay_ms: u64,
    /// `None` while `Reconnecting` means the delay starts at the next poll.
    reconnect_at: Option<u64>,
    /// Open attempts since the last successful open.
    attempts: u32,
    signals: VecDeque<LinkSignal>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, reconnect_delay_ms: u64) -> Self {
        Self {
            transport,
            state: LinkState::Disconnected,
            url: String::new(),
            reconnect_delay_ms,
            reconnect_at: None,
            attempts: 0,
            signals: VecDeque::new(),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// When the next automatic open attempt is due, if one is scheduled.
    pub fn reconnect_deadline(&self) -> Option<u64> {
        self.reconnect_at
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Start the machine.  Ignored unless currently `Disconnected`.
    pub fn connect(&mut self, url: &str, now_ms: u64) {
        if self.state != LinkState::Disconnected {
            debug!("Link: connect ignored while {}", self.state);
            return;
        }
        url.clone_into(&mut self.url);
        self.attempts = 0;
        self.begin_open(now_ms);
    }

    /// Drain transport events and fire the reconnect timer.
    pub fn poll(&mut self, now_ms: u64) {
        while let Some(event) = self.transport.poll_event() {
            self.handle_event(event, now_ms);
        }

        if self.state != LinkState::Reconnecting {
            return;
        }
        match self.reconnect_at {
            None => {
                let at = now_ms.saturating_add(self.reconnect_delay_ms);
                debug!("Link: retry scheduled for {} ms", at);
                self.reconnect_at = Some(at);
            }
            Some(at) if now_ms >= at => {
                self.reconnect_at = None;
                self.begin_open(now_ms);
            }
            Some(_) => {}
        }
    }

    /// Send one text frame.  Never queues.
    pub fn send(&mut self, text: &str) -> Result<(), LinkError> {
        if self.state != LinkState::Connected {
            return Err(LinkError::NotConnected);
        }
        if let Err(e) = self.transport.send_text(text) {
            warn!("Link: send failed ({}), reconnecting", e);
            self.lose_channel(None);
            return Err(LinkError::Transport(e));
        }
        Ok(())
    }

    /// Terminal for this session.  Cancels any pending retry.  Idempotent.
    pub fn close(&mut self) {
        self.reconnect_at = None;
        if self.state == LinkState::Disconnected {
            return;
        }
        self.transport.close();
        self.transition(LinkState::Disconnected);
        info!("Link: closed");
    }

    pub fn pop_signal(&mut self) -> Option<LinkSignal> {
        self.signals.pop_front()
    }

    /// Hand every queued signal to `handler`, oldest first.
    pub fn drain_signals(&mut self, mut handler: impl FnMut(LinkSignal)) {
        while let Some(sig) = self.signals.pop_front() {
            handler(sig);
        }
    }

    // ── Internals ────────────────────────────────────────────

    fn begin_open(&mut self, now_ms: u64) {
        self.attempts = self.attempts.saturating_add(1);
        self.transition(LinkState::Connecting);
        info!("Link: opening {} (attempt {})", self.url, self.attempts);

        if let Err(e) = self.transport.open(&self.url) {
            warn!("Link: open failed: {}", e);
            self.lose_channel(Some(now_ms));
        }
    }

    fn handle_event(&mut self, event: TransportEvent, now_ms: u64) {
        match (self.state, event) {
            (LinkState::Connecting, TransportEvent::Opened) => {
                info!("Link: channel open after {} attempt(s)", self.attempts);
                self.attempts = 0;
                self.transition(LinkState::Connected);
            }
            (LinkState::Connected, TransportEvent::Message(text)) => {
                self.signals.push_back(LinkSignal::Frame(text));
            }
            (
                LinkState::Connecting | LinkState::Connected,
                TransportEvent::Closed,
            ) => {
                warn!("Link: channel closed by peer");
                self.lose_channel(Some(now_ms));
            }
            (
                LinkState::Connecting | LinkState::Connected,
                TransportEvent::Error(reason),
            ) => {
                warn!("Link: channel error: {}", reason);
                self.lose_channel(Some(now_ms));
            }
            (state, event) => {
                debug!("Link: dropping {:?} while {}", event, state);
            }
        }
    }

    /// Tear down the channel and schedule the next attempt one delay after
    /// `lost_at`, or at the next poll when the loss time is unknown.
    fn lose_channel(&mut self, lost_at: Option<u64>) {
        self.transport.close();
        self.reconnect_at = lost_at.map(|t| t.saturating_add(self.reconnect_delay_ms));
        self.transition(LinkState::Reconnecting);
    }

    fn transition(&mut self, to: LinkState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        self.signals.push_back(LinkSignal::StateChanged { from, to });
    }
}

impl<T: Transport> FrameSink for ConnectionManager<T> {
    fn link_state(&self) -> LinkState {
        self.state
    }

    fn send_frame(&mut self, text: &str) -> Result<(), LinkError> {
        self.send(text)
    }
}
