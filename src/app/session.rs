//! One console session: the single owner of every link component.
//!
//! ```text
//!            ┌──────────────────────── LinkSession ─────────────────────────┐
//! Command ──▶│ Dispatcher ──▶ codec::encode ──▶ ConnectionManager ──▶ wire  │
//!            │                                        │                     │
//!            │      ConsoleUi ◀── router ◀── codec::decode ◀── signals      │
//!            │                                                              │
//!            │  StatusPoller (Connected) / FallbackPoller (otherwise)       │
//!            │  HttpControl (/control, /pid)                                │
//!            └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Constructed once per process and passed by `&mut`.  All time is
//! injected as `now_ms`, so the whole session can be driven from tests.

use log::{debug, info, warn};

use crate::app::commands::{Command, ConsoleRequest, ControlAction, PidController, PidPair, PidParameters};
use crate::app::control::HttpControl;
use crate::app::events::{RunState, TelemetryEvent, TelemetrySnapshot};
use crate::app::ports::{ConsoleUi, HttpControlPort, NotifyLevel, TelemetrySource};
use crate::config::LinkConfig;
use crate::error::{CodecError, DispatchError, HttpControlError};
use crate::link::codec;
use crate::link::connection::{ConnectionManager, LinkSignal, LinkState};
use crate::link::dispatcher::Dispatcher;
use crate::link::fallback::FallbackPoller;
use crate::link::router;
use crate::link::status_poll::StatusPoller;
use crate::link::telemetry::{self, TelemetryLink, TelemetryMode};
use crate::link::transport::Transport;

/// Whether the console loop should keep going after a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct LinkSession<T: Transport, H: HttpControlPort> {
    config: LinkConfig,
    conn: ConnectionManager<T>,
    dispatcher: Dispatcher,
    fallback: FallbackPoller,
    status_poll: StatusPoller,
    control: HttpControl<H>,
    snapshot: TelemetrySnapshot,
    open: bool,
    now_ms: u64,
}

impl<T: Transport, H: HttpControlPort> LinkSession<T, H> {
    pub fn new(config: LinkConfig, transport: T, http: H) -> Self {
        Self {
            conn: ConnectionManager::new(transport, config.reconnect_delay_ms),
            dispatcher: Dispatcher::new(config.dispatch_rate_per_sec, config.dispatch_burst),
            fallback: FallbackPoller::new(&config),
            status_poll: StatusPoller::new(config.status_poll_interval_ms),
            control: HttpControl::new(http),
            snapshot: TelemetrySnapshot::default(),
            open: false,
            now_ms: 0,
            config,
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn state(&self) -> LinkState {
        self.conn.state()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    pub fn run_state(&self) -> RunState {
        self.control.run_state()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut ConnectionManager<T> {
        &mut self.conn
    }

    pub fn http(&self) -> &H {
        self.control.port()
    }

    pub fn http_mut(&mut self) -> &mut H {
        self.control.port_mut()
    }

    pub fn is_fallback_active(&self) -> bool {
        self.fallback.is_running()
    }

    pub fn is_status_poll_active(&self) -> bool {
        self.status_poll.is_running()
    }

    // ── Lifecycle ────────────────────────────────────────────

    /// Start connecting.  The dashboard runs on simulated values until
    /// the channel is up.
    pub fn open(&mut self, now_ms: u64, ui: &mut dyn ConsoleUi) {
        if self.open {
            debug!("Session: already open");
            return;
        }
        self.open = true;
        self.now_ms = now_ms;
        info!("Session: open, peer {}", self.config.ws_url());

        self.select_telemetry(now_ms, self.conn.state());
        let url = self.config.ws_url();
        self.conn.connect(&url, now_ms);
        self.pump(ui);
    }

    /// Terminal.  Cancels the reconnect timer and both pollers.
    pub fn close(&mut self, ui: &mut dyn ConsoleUi) {
        if !self.open {
            return;
        }
        self.open = false;
        self.conn.close();
        self.pump(ui);
        self.fallback.stop();
        self.status_poll.stop();
        info!("Session: closed");
    }

    /// Drive transport polling, the reconnect timer and the active
    /// telemetry link.
    pub fn tick(&mut self, now_ms: u64, ui: &mut dyn ConsoleUi) {
        if !self.open {
            return;
        }
        self.now_ms = now_ms;
        self.conn.poll(now_ms);
        self.pump(ui);

        match telemetry::for_state(self.conn.state()) {
            TelemetryMode::Live => {
                self.status_poll.poll(now_ms, &mut self.conn);
            }
            TelemetryMode::Fallback => {
                if let Some(update) = self.fallback.poll(now_ms, &mut self.conn) {
                    self.snapshot.apply(&update);
                    ui.on_status(&update, TelemetrySource::Simulated);
                }
            }
        }
        // A failed status request may have dropped the link.
        self.pump(ui);
    }

    // ── Commands ─────────────────────────────────────────────

    /// Send one command over the duplex channel.  Failures are also
    /// reported to the user.
    pub fn dispatch(&mut self, cmd: &Command, ui: &mut dyn ConsoleUi) -> Result<(), DispatchError> {
        let result = self.dispatcher.dispatch(cmd, &mut self.conn);
        if let Err(e) = &result {
            let level = match e {
                DispatchError::RateLimited => NotifyLevel::Warning,
                _ => NotifyLevel::Error,
            };
            ui.notify(level, &format!("{} not sent: {}", cmd.name(), e));
        }
        self.pump(ui);
        result
    }

    pub fn http_control(
        &mut self,
        action: ControlAction,
        speed: i32,
        ui: &mut dyn ConsoleUi,
    ) -> Result<(), HttpControlError> {
        self.control.control(action, speed, ui)
    }

    pub fn http_set_pid(
        &mut self,
        controller: PidController,
        params: PidParameters,
        ui: &mut dyn ConsoleUi,
    ) -> Result<(), HttpControlError> {
        self.control.set_pid(controller, params, ui)
    }

    pub fn http_apply_pid_pair(
        &mut self,
        pair: &PidPair,
        ui: &mut dyn ConsoleUi,
    ) -> Result<(), HttpControlError> {
        self.control.apply_pid_pair(pair, ui)
    }

    /// Execute one console request.  `form` is the UI's PID form state.
    pub fn handle(
        &mut self,
        request: ConsoleRequest,
        form: &mut PidPair,
        ui: &mut dyn ConsoleUi,
    ) -> Flow {
        match request {
            ConsoleRequest::Send(cmd) => {
                let _ = self.dispatch(&cmd, ui);
            }
            ConsoleRequest::EditPid(controller, params) => {
                form.set(controller, params);
                ui.notify(
                    NotifyLevel::Info,
                    &format!(
                        "{} PID form: kp={} ki={} kd={}",
                        controller.as_str(),
                        params.kp,
                        params.ki,
                        params.kd
                    ),
                );
            }
            ConsoleRequest::ResetPid => {
                form.reset();
                ui.notify(NotifyLevel::Info, "PID form reset to defaults");
            }
            ConsoleRequest::SendPid(controller) => {
                let cmd = Command::set_pid(controller, form.get(controller));
                let _ = self.dispatch(&cmd, ui);
            }
            ConsoleRequest::Http { action, speed } => {
                let _ = self.http_control(action, speed, ui);
            }
            ConsoleRequest::HttpApplyPid => {
                let pair = *form;
                let _ = self.http_apply_pid_pair(&pair, ui);
            }
            ConsoleRequest::Quit => {
                self.close(ui);
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    // ── Internals ────────────────────────────────────────────

    /// Forward queued link signals, oldest first.
    fn pump(&mut self, ui: &mut dyn ConsoleUi) {
        while let Some(signal) = self.conn.pop_signal() {
            match signal {
                LinkSignal::StateChanged { from, to } => {
                    info!("Session: link {} -> {}", from, to);
                    ui.on_link_state(from, to);
                    self.select_telemetry(self.now_ms, to);
                }
                LinkSignal::Frame(text) => self.handle_frame(&text, ui),
            }
        }
    }

    fn select_telemetry(&mut self, now_ms: u64, state: LinkState) {
        let (active, idle): (&mut dyn TelemetryLink, &mut dyn TelemetryLink) =
            match telemetry::for_state(state) {
                TelemetryMode::Live => (&mut self.status_poll, &mut self.fallback),
                TelemetryMode::Fallback => (&mut self.fallback, &mut self.status_poll),
            };
        idle.stop();
        if self.open && !active.is_running() {
            debug!("Session: telemetry via {}", active.name());
            active.start(now_ms, &self.snapshot);
        }
    }

    fn handle_frame(&mut self, text: &str, ui: &mut dyn ConsoleUi) {
        match codec::decode(text) {
            Ok(TelemetryEvent::StatusUpdate(update)) if update.is_empty() => {
                debug!("Session: empty status update");
            }
            Ok(event) => {
                if let TelemetryEvent::StatusUpdate(update) = &event {
                    self.snapshot.apply(update);
                }
                router::route(&event, ui);
            }
            Err(CodecError::UnknownType(name)) => {
                debug!("Session: ignoring message type '{}'", name);
            }
            Err(e @ CodecError::Malformed(_)) => {
                warn!("Session: dropped frame: {}", e);
            }
        }
    }
}
