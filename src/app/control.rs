//! Non-realtime HTTP control path.
//!
//! ```text
//! GET /control?command=start|stop|beep&speed=<int>
//! GET /pid?direction=direction|speed&kp=<f>&ki=<f>&kd=<f>
//! ```
//!
//! 2xx is success; any other status or a request failure is surfaced to
//! the user and never retried.  Only a confirmed `start`/`stop` changes
//! the [`RunState`].

use log::{info, warn};

use crate::app::commands::{ControlAction, PidController, PidPair, PidParameters};
use crate::app::events::RunState;
use crate::app::ports::{ConsoleUi, HttpControlPort, NotifyLevel};
use crate::error::HttpControlError;

pub struct HttpControl<H: HttpControlPort> {
    port: H,
    run_state: RunState,
}

impl<H: HttpControlPort> HttpControl<H> {
    pub fn new(port: H) -> Self {
        Self {
            port,
            run_state: RunState::Idle,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn port(&self) -> &H {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut H {
        &mut self.port
    }

    pub fn control(
        &mut self,
        action: ControlAction,
        speed: i32,
        ui: &mut dyn ConsoleUi,
    ) -> Result<(), HttpControlError> {
        let query = [
            ("command", action.as_str().to_owned()),
            ("speed", speed.to_string()),
        ];
        if let Err(e) = self.get("/control", &query) {
            warn!("HTTP: {} failed: {}", action.as_str(), e);
            ui.notify(NotifyLevel::Error, &format!("{} failed: {}", action.as_str(), e));
            return Err(e);
        }

        let next = match action {
            ControlAction::Start => Some(RunState::Running),
            ControlAction::Stop => Some(RunState::Stopped),
            ControlAction::Beep => None,
        };
        if let Some(state) = next {
            info!("HTTP: run state {} -> {}", self.run_state.label(), state.label());
            self.run_state = state;
            ui.on_run_state(state);
        }
        ui.notify(NotifyLevel::Success, &format!("{} command sent", action.as_str()));
        Ok(())
    }

    pub fn set_pid(
        &mut self,
        controller: PidController,
        params: PidParameters,
        ui: &mut dyn ConsoleUi,
    ) -> Result<(), HttpControlError> {
        let query = [
            ("direction", controller.as_str().to_owned()),
            ("kp", params.kp.to_string()),
            ("ki", params.ki.to_string()),
            ("kd", params.kd.to_string()),
        ];
        match self.get("/pid", &query) {
            Ok(()) => {
                info!(
                    "HTTP: {} PID set kp={} ki={} kd={}",
                    controller.as_str(),
                    params.kp,
                    params.ki,
                    params.kd
                );
                Ok(())
            }
            Err(e) => {
                warn!("HTTP: {} PID update failed: {}", controller.as_str(), e);
                ui.notify(
                    NotifyLevel::Error,
                    &format!("{} PID update failed: {}", controller.as_str(), e),
                );
                Err(e)
            }
        }
    }

    /// Direction first, then speed.  Stops at the first failure.
    pub fn apply_pid_pair(
        &mut self,
        pair: &PidPair,
        ui: &mut dyn ConsoleUi,
    ) -> Result<(), HttpControlError> {
        self.set_pid(PidController::Direction, pair.direction, ui)?;
        self.set_pid(PidController::Speed, pair.speed, ui)?;
        ui.notify(NotifyLevel::Success, "PID parameters updated");
        Ok(())
    }

    fn get(&mut self, path: &str, query: &[(&str, String)]) -> Result<(), HttpControlError> {
        let status = self.port.get(path, query)?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(HttpControlError::Status(status))
        }
    }
}
