//! Port traits: the boundary between the link core and the outside world.
//!
//! ```text
//!   Transport ──▶ ConnectionManager ──▶ LinkSession ──▶ ConsoleUi
//!                                          │
//!                                          └──▶ HttpControlPort
//! ```
//!
//! Driving adapters (WebSocket client, HTTP client, log renderer, config
//! loader) implement these traits.  [`LinkSession`](super::session::LinkSession)
//! consumes them via generics or `&mut dyn`, so the core never touches a
//! socket directly and every path can be exercised with mocks.
//!
//! The duplex-channel port lives next to its consumer in
//! [`crate::link::transport`].

use crate::app::events::{RunState, StatusUpdate};
use crate::config::LinkConfig;
use crate::error::HttpControlError;
use crate::link::connection::LinkState;

// ───────────────────────────────────────────────────────────────
// Console UI port (driven adapter: link → user)
// ───────────────────────────────────────────────────────────────

/// Where a status update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetrySource {
    /// Decoded from a peer frame.
    Live,
    /// Synthesized by the fallback poller while the link is down.
    Simulated,
}

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Render callbacks for the console.
///
/// Every inbound telemetry variant maps to exactly one of these; the link
/// core never decides how anything is displayed.
pub trait ConsoleUi {
    /// Connection indicator.  Called once per link state transition.
    fn on_link_state(&mut self, from: LinkState, to: LinkState);

    /// Connection log line from the peer's greeting.
    fn on_connected(&mut self, message: &str);

    /// Advisory acknowledgement of a `move`.  No retry semantics.
    fn on_move_ack(&mut self);

    /// User-visible error reported by the peer.
    fn on_error(&mut self, message: &str);

    /// Dashboard update.  Absent fields must leave the display untouched.
    fn on_status(&mut self, update: &StatusUpdate, source: TelemetrySource);

    /// Highest-priority alert; preempts ordinary notifications.
    fn on_emergency(&mut self, message: Option<&str>);

    /// Transient toast-style notification.
    fn notify(&mut self, level: NotifyLevel, message: &str);

    /// Vehicle run state as confirmed by the HTTP surface.
    fn on_run_state(&mut self, state: RunState);
}

// ───────────────────────────────────────────────────────────────
// HTTP control port (driven adapter: link → peer, request/response)
// ───────────────────────────────────────────────────────────────

/// Plain request/response surface for non-realtime commands.
pub trait HttpControlPort {
    /// Issue `GET <base><path>?<query>` and return the status code.
    ///
    /// Only transport-level failures are errors here; status interpretation
    /// is left to the caller.
    fn get(&mut self, path: &str, query: &[(&str, String)]) -> Result<u16, HttpControlError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads link configuration.
///
/// Implementations MUST validate before returning; invalid values are
/// rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Returns [`LinkConfig::default()`] when nothing is configured.
    fn load(&self) -> Result<LinkConfig, ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An explicitly named config source does not exist.
    NotFound,
    /// The config source could not be parsed.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
