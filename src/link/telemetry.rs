//! Telemetry source capability.
//!
//! Two implementations share this interface:
//!
//! | Link state     | Implementation                                  |
//! |----------------|-------------------------------------------------|
//! | `Connected`    | [`StatusPoller`](super::status_poll::StatusPoller): asks the peer |
//! | anything else  | [`FallbackPoller`](super::fallback::FallbackPoller): simulates |
//!
//! The session runs exactly one of them at a time, chosen by
//! [`for_state`].

use super::connection::{FrameSink, LinkState};
use crate::app::events::{StatusUpdate, TelemetrySnapshot};

pub trait TelemetryLink {
    fn name(&self) -> &'static str;

    /// Begin producing telemetry.  No-op when already running.
    fn start(&mut self, now_ms: u64, seed: &TelemetrySnapshot);

    /// Cancel the interval.  Idempotent.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Advance to `now_ms`.  Returns a locally produced update, if any;
    /// live replies arrive separately as inbound frames.
    fn poll(&mut self, now_ms: u64, sink: &mut dyn FrameSink) -> Option<StatusUpdate>;
}

/// Which implementation should be running for `state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryMode {
    Live,
    Fallback,
}

pub fn for_state(state: LinkState) -> TelemetryMode {
    match state {
        LinkState::Connected => TelemetryMode::Live,
        LinkState::Disconnected | LinkState::Connecting | LinkState::Reconnecting => {
            TelemetryMode::Fallback
        }
    }
}
