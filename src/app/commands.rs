//! Outbound commands and console requests.
//!
//! [`Command`] is what travels to the vehicle over the duplex channel.
//! [`ConsoleRequest`] is what the UI collaborator asks the link loop to do;
//! most requests wrap a `Command`, the rest target the HTTP surface or the
//! session lifecycle.

use core::fmt;

use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────
// PID parameters
// ───────────────────────────────────────────────────────────────

/// Which closed loop on the vehicle a PID triple belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PidController {
    Direction,
    Speed,
}

impl PidController {
    /// Value used for the `direction` query parameter of `/pid`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direction => "direction",
            Self::Speed => "speed",
        }
    }
}

/// Gains for one PID loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidParameters {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidParameters {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.1,
            kd: 0.1,
        }
    }
}

impl PidParameters {
    pub fn is_valid(&self) -> bool {
        [self.kp, self.ki, self.kd]
            .iter()
            .all(|g| g.is_finite() && *g >= 0.0)
    }
}

/// Both PID triples as edited in the console form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidPair {
    pub direction: PidParameters,
    pub speed: PidParameters,
}

impl PidPair {
    pub fn get(&self, controller: PidController) -> PidParameters {
        match controller {
            PidController::Direction => self.direction,
            PidController::Speed => self.speed,
        }
    }

    pub fn set(&mut self, controller: PidController, params: PidParameters) {
        match controller {
            PidController::Direction => self.direction = params,
            PidController::Speed => self.speed = params,
        }
    }

    /// Restore both loops to the factory gains.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ───────────────────────────────────────────────────────────────
// Wire command
// ───────────────────────────────────────────────────────────────

/// A command for the vehicle.  Serialises to a flat object tagged by `type`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Differential drive request.  Held buttons re-send the same value.
    Move {
        #[serde(rename = "turn_angle")]
        turn_angle_deg: i32,
        left_speed: i32,
        right_speed: i32,
    },
    Start,
    Stop,
    Beep,
    SetPid {
        controller: PidController,
        kp: f64,
        ki: f64,
        kd: f64,
    },
    /// Bypasses rate limiting; never coalesced.
    EmergencyStop,
}

impl Command {
    pub fn set_pid(controller: PidController, params: PidParameters) -> Self {
        Self::SetPid {
            controller,
            kp: params.kp,
            ki: params.ki,
            kd: params.kd,
        }
    }

    /// Wire discriminant, also used in log lines.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Beep => "beep",
            Self::SetPid { .. } => "set_pid",
            Self::EmergencyStop => "emergency_stop",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// HTTP control actions
// ───────────────────────────────────────────────────────────────

/// Non-realtime actions carried by `GET /control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Start,
    Stop,
    Beep,
}

impl ControlAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Beep => "beep",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Console requests
// ───────────────────────────────────────────────────────────────

/// Requests the UI collaborator sends into the link loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleRequest {
    /// Dispatch over the duplex channel.
    Send(Command),
    /// Edit one PID triple in the local form (nothing is sent).
    EditPid(PidController, PidParameters),
    /// Restore both form triples to defaults.
    ResetPid,
    /// Send the form's triple for one loop over the duplex channel.
    SendPid(PidController),
    /// `GET /control` on the HTTP surface.
    Http { action: ControlAction, speed: i32 },
    /// Apply both form triples via `GET /pid` (direction, then speed).
    HttpApplyPid,
    /// Close the session and leave the loop.
    Quit,
}

/// Why a console line could not be turned into a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownVerb,
    MissingArgument(&'static str),
    BadNumber(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::UnknownVerb => write!(f, "unknown command"),
            Self::MissingArgument(name) => write!(f, "missing argument: {name}"),
            Self::BadNumber(name) => write!(f, "not a number: {name}"),
        }
    }
}

/// Speed used by `http start|stop|beep` when none is given.
pub const DEFAULT_HTTP_SPEED: i32 = 50;

impl ConsoleRequest {
    /// Parse one line of the text console.
    ///
    /// ```text
    /// move <turn_angle> <left> <right>   start | stop | beep | estop
    /// pid <direction|speed> <kp> <ki> <kd>
    /// pid send <direction|speed>         pid reset
    /// http <start|stop|beep> [speed]     http pid
    /// quit
    /// ```
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(ParseError::Empty)?;

        match verb {
            "move" | "m" => {
                let turn_angle_deg = int_arg(words.next(), "turn_angle")?;
                let left_speed = int_arg(words.next(), "left_speed")?;
                let right_speed = int_arg(words.next(), "right_speed")?;
                Ok(Self::Send(Command::Move {
                    turn_angle_deg,
                    left_speed,
                    right_speed,
                }))
            }
            "start" => Ok(Self::Send(Command::Start)),
            "stop" => Ok(Self::Send(Command::Stop)),
            "beep" => Ok(Self::Send(Command::Beep)),
            "estop" | "emergency" => Ok(Self::Send(Command::EmergencyStop)),
            "pid" => match words.next() {
                Some("reset") => Ok(Self::ResetPid),
                Some("send") => Ok(Self::SendPid(controller_arg(words.next())?)),
                other => {
                    let controller = controller_arg(other)?;
                    let params = PidParameters {
                        kp: float_arg(words.next(), "kp")?,
                        ki: float_arg(words.next(), "ki")?,
                        kd: float_arg(words.next(), "kd")?,
                    };
                    Ok(Self::EditPid(controller, params))
                }
            },
            "http" => {
                let action = match words.next() {
                    Some("start") => ControlAction::Start,
                    Some("stop") => ControlAction::Stop,
                    Some("beep") => ControlAction::Beep,
                    Some("pid") => return Ok(Self::HttpApplyPid),
                    Some(_) => return Err(ParseError::UnknownVerb),
                    None => return Err(ParseError::MissingArgument("action")),
                };
                let speed = match words.next() {
                    Some(w) => w.parse().map_err(|_| ParseError::BadNumber("speed"))?,
                    None => DEFAULT_HTTP_SPEED,
                };
                Ok(Self::Http { action, speed })
            }
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(ParseError::UnknownVerb),
        }
    }
}

fn int_arg(word: Option<&str>, name: &'static str) -> Result<i32, ParseError> {
    word.ok_or(ParseError::MissingArgument(name))?
        .parse()
        .map_err(|_| ParseError::BadNumber(name))
}

fn float_arg(word: Option<&str>, name: &'static str) -> Result<f64, ParseError> {
    word.ok_or(ParseError::MissingArgument(name))?
        .parse()
        .map_err(|_| ParseError::BadNumber(name))
}

fn controller_arg(word: Option<&str>) -> Result<PidController, ParseError> {
    match word {
        Some("direction" | "dir") => Ok(PidController::Direction),
        Some("speed") => Ok(PidController::Speed),
        Some(_) => Err(ParseError::UnknownVerb),
        None => Err(ParseError::MissingArgument("controller")),
    }
}
