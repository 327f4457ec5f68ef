//! Inbound demultiplexer.
//!
//! Pure 1:1 mapping from [`TelemetryEvent`] variants onto [`ConsoleUi`]
//! callbacks.  No decisions are made here; the session updates its
//! snapshot before routing.

use log::debug;

use crate::app::events::TelemetryEvent;
use crate::app::ports::{ConsoleUi, NotifyLevel, TelemetrySource};

pub fn route(event: &TelemetryEvent, ui: &mut dyn ConsoleUi) {
    match event {
        TelemetryEvent::Connected { message } => ui.on_connected(message),
        TelemetryEvent::MoveAck => {
            debug!("Router: move acknowledged");
            ui.on_move_ack();
        }
        TelemetryEvent::Error { message } => ui.on_error(message),
        TelemetryEvent::StatusUpdate(update) => ui.on_status(update, TelemetrySource::Live),
        TelemetryEvent::EmergencyAlert { message } => ui.on_emergency(message.as_deref()),
        TelemetryEvent::ControlResponse { ok, message } => {
            let (level, fallback) = if *ok {
                (NotifyLevel::Success, "command accepted")
            } else {
                (NotifyLevel::Error, "command failed")
            };
            ui.notify(level, message.as_deref().unwrap_or(fallback));
        }
    }
}
