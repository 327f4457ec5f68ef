//! Log-based console UI adapter.
//!
//! Implements [`ConsoleUi`] by writing one structured line per callback to
//! the `log` facade (stderr via `env_logger` in the binary).  A graphical
//! front end would implement the same trait.

use log::{error, info, warn};

use crate::app::events::{RunState, StatusUpdate, TelemetrySnapshot};
use crate::app::ports::{ConsoleUi, NotifyLevel, TelemetrySource};
use crate::link::connection::LinkState;

/// Renders the dashboard as log lines and keeps the last shown values.
#[derive(Debug, Default)]
pub struct LogConsoleUi {
    dashboard: TelemetrySnapshot,
    run_state: RunState,
    link: LinkState,
}

impl LogConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dashboard(&self) -> &TelemetrySnapshot {
        &self.dashboard
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn link(&self) -> LinkState {
        self.link
    }
}

fn or_dash(v: Option<f32>) -> String {
    v.map_or_else(|| "--".to_owned(), |x| format!("{x:.1}"))
}

impl ConsoleUi for LogConsoleUi {
    fn on_link_state(&mut self, from: LinkState, to: LinkState) {
        self.link = to;
        info!("LINK  | {} -> {}", from, to);
    }

    fn on_connected(&mut self, message: &str) {
        info!("PEER  | {}", message);
    }

    fn on_move_ack(&mut self) {
        info!("ACK   | move");
    }

    fn on_error(&mut self, message: &str) {
        error!("ERROR | {}", message);
    }

    fn on_status(&mut self, update: &StatusUpdate, source: TelemetrySource) {
        self.dashboard.apply(update);
        let tag = match source {
            TelemetrySource::Live => "live",
            TelemetrySource::Simulated => "sim",
        };
        info!(
            "TELEM | {} | speed={} | battery={}% | angle={} | uptime={} | run={}",
            tag,
            or_dash(self.dashboard.current_speed),
            or_dash(self.dashboard.battery_level),
            or_dash(self.dashboard.angle),
            self.dashboard.uptime_display(),
            self.run_state.label(),
        );
    }

    fn on_emergency(&mut self, message: Option<&str>) {
        error!("ALERT | EMERGENCY {}", message.unwrap_or("stop activated"));
    }

    fn notify(&mut self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Info => info!("NOTE  | {}", message),
            NotifyLevel::Success => info!("OK    | {}", message),
            NotifyLevel::Warning => warn!("WARN  | {}", message),
            NotifyLevel::Error => error!("FAIL  | {}", message),
        }
    }

    fn on_run_state(&mut self, state: RunState) {
        self.run_state = state;
        info!("RUN   | {}", state.label());
    }
}
