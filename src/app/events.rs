//! Inbound telemetry values and the dashboard state they feed.
//!
//! The [codec](crate::link::codec) produces [`TelemetryEvent`]s from wire
//! frames; the [router](crate::link::router) hands each one to the
//! [`ConsoleUi`](super::ports::ConsoleUi).

use core::fmt::Write as _;

/// Everything the peer can tell the console.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// Greeting sent once the channel is up.
    Connected { message: String },

    /// Advisory acknowledgement of a `move` command.
    MoveAck,

    /// Peer-side failure the user must see.
    Error { message: String },

    /// Partial or complete dashboard values.
    StatusUpdate(StatusUpdate),

    /// Peer raised an emergency condition.
    EmergencyAlert { message: Option<String> },

    /// Per-command result reported by the peer.
    ControlResponse { ok: bool, message: Option<String> },
}

/// Dashboard values.  Every field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatusUpdate {
    pub current_speed: Option<f32>,
    pub battery_level: Option<f32>,
    pub uptime_seconds: Option<u64>,
    pub angle: Option<f32>,
}

impl StatusUpdate {
    pub fn is_empty(&self) -> bool {
        self.current_speed.is_none()
            && self.battery_level.is_none()
            && self.uptime_seconds.is_none()
            && self.angle.is_none()
    }
}

/// Vehicle start/stop status as confirmed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Stopped,
}

impl RunState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Snapshot
// ───────────────────────────────────────────────────────────────

/// Last values shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    pub current_speed: Option<f32>,
    pub battery_level: Option<f32>,
    pub uptime_seconds: Option<u64>,
    pub angle: Option<f32>,
}

/// Fits the widest rendering of `u64::MAX` seconds (22 bytes).
pub const UPTIME_DISPLAY_LEN: usize = 24;

const NO_UPTIME: &str = "--:--:--";

impl TelemetrySnapshot {
    /// Overwrite the fields present in `update`; keep the rest.
    pub fn apply(&mut self, update: &StatusUpdate) {
        if let Some(v) = update.current_speed {
            self.current_speed = Some(v);
        }
        if let Some(v) = update.battery_level {
            self.battery_level = Some(v);
        }
        if let Some(v) = update.uptime_seconds {
            self.uptime_seconds = Some(v);
        }
        if let Some(v) = update.angle {
            self.angle = Some(v);
        }
    }

    /// `HH:MM:SS`, or `--:--:--` before any uptime has been seen.  Hours
    /// are not wrapped, so long uptimes widen the first field.
    pub fn uptime_display(&self) -> heapless::String<UPTIME_DISPLAY_LEN> {
        let mut out = heapless::String::new();
        let Some(secs) = self.uptime_seconds else {
            let _ = out.push_str(NO_UPTIME);
            return out;
        };
        if write!(out, "{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60).is_err() {
            out.clear();
            let _ = out.push_str(NO_UPTIME);
        }
        out
    }
}
