//! JSON text-frame codec.
//!
//! Wire format: one UTF-8 text frame per message, carrying a flat JSON
//! object tagged by `type`:
//!
//! ```text
//! {"type":"move","turn_angle":0,"left_speed":50,"right_speed":50}
//! {"type":"status_update","battery_level":84.9,"uptime":"00:01:02"}
//! ```
//!
//! Encoding carries command fields verbatim; range checks belong to the
//! [dispatcher](super::dispatcher).  Decoding dispatches on `type`.  An
//! unknown discriminant is a soft failure ([`CodecError::UnknownType`]);
//! anything structurally wrong is [`CodecError::Malformed`].

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::app::commands::Command;
use crate::app::events::{StatusUpdate, TelemetryEvent};
use crate::error::CodecError;

/// Discriminants [`decode_command`] accepts.
const COMMAND_TYPES: [&str; 6] = ["move", "start", "stop", "beep", "set_pid", "emergency_stop"];

// ───────────────────────────────────────────────────────────────
// Outbound
// ───────────────────────────────────────────────────────────────

/// Serialize a command into one text frame.
pub fn encode(cmd: &Command) -> String {
    let value = match *cmd {
        Command::Move {
            turn_angle_deg,
            left_speed,
            right_speed,
        } => json!({
            "type": "move",
            "turn_angle": turn_angle_deg,
            "left_speed": left_speed,
            "right_speed": right_speed,
        }),
        Command::SetPid {
            controller,
            kp,
            ki,
            kd,
        } => json!({
            "type": "set_pid",
            "controller": controller.as_str(),
            "kp": kp,
            "ki": ki,
            "kd": kd,
        }),
        Command::Start | Command::Stop | Command::Beep | Command::EmergencyStop => {
            json!({ "type": cmd.name() })
        }
    };
    value.to_string()
}

/// The live status request sent by the status poller.
pub fn encode_status_request() -> String {
    json!({ "type": "get_status" }).to_string()
}

/// Inverse of [`encode`].  Used by peer simulators and tests.
pub fn decode_command(text: &str) -> Result<Command, CodecError> {
    let (kind, map) = tagged_object(text)?;
    if !COMMAND_TYPES.contains(&kind.as_str()) {
        return Err(CodecError::unknown(&kind));
    }
    serde_json::from_value(Value::Object(map)).map_err(|_| CodecError::Malformed("bad command fields"))
}

// ───────────────────────────────────────────────────────────────
// Inbound
// ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct OptionalMessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct StatusBody {
    #[serde(default)]
    current_speed: Option<f32>,
    #[serde(default)]
    battery_level: Option<f32>,
    #[serde(default)]
    uptime: Option<Uptime>,
    #[serde(default)]
    angle: Option<f32>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResponseBody {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Peers report uptime either as seconds or as a `HH:MM:SS` clock.
#[derive(Deserialize)]
#[serde(untagged)]
enum Uptime {
    Seconds(f64),
    Clock(String),
}

impl Uptime {
    fn to_seconds(&self) -> Result<u64, CodecError> {
        match self {
            Self::Seconds(s) if s.is_finite() && *s >= 0.0 => Ok(*s as u64),
            Self::Seconds(_) => Err(CodecError::Malformed("negative uptime")),
            Self::Clock(text) => parse_clock(text).ok_or(CodecError::Malformed("bad uptime clock")),
        }
    }
}

fn parse_clock(text: &str) -> Option<u64> {
    let mut parts = text.split(':');
    let h: u64 = parts.next()?.trim().parse().ok()?;
    let m: u64 = parts.next()?.trim().parse().ok()?;
    let s: u64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() || m >= 60 || s >= 60 {
        return None;
    }
    h.checked_mul(3600)?.checked_add(m * 60 + s)
}

/// Decode one inbound text frame.
pub fn decode(text: &str) -> Result<TelemetryEvent, CodecError> {
    let (kind, map) = tagged_object(text)?;
    let value = Value::Object(map);

    match kind.as_str() {
        "connected" => {
            let body: MessageBody = fields(value)?;
            Ok(TelemetryEvent::Connected {
                message: body.message,
            })
        }
        "move_ack" => Ok(TelemetryEvent::MoveAck),
        "error" => {
            let body: MessageBody = fields(value)?;
            Ok(TelemetryEvent::Error {
                message: body.message,
            })
        }
        "status_update" | "status_data" => {
            let body: StatusBody = fields(value)?;
            if let Some(message) = body.error {
                return Ok(TelemetryEvent::Error { message });
            }
            let uptime_seconds = body.uptime.as_ref().map(Uptime::to_seconds).transpose()?;
            Ok(TelemetryEvent::StatusUpdate(StatusUpdate {
                current_speed: body.current_speed,
                battery_level: body.battery_level,
                uptime_seconds,
                angle: body.angle,
            }))
        }
        "emergency_alert" => {
            let body: OptionalMessageBody = fields(value)?;
            Ok(TelemetryEvent::EmergencyAlert {
                message: body.message,
            })
        }
        "control_response" | "emergency_response" => {
            let body: ResponseBody = fields(value)?;
            Ok(TelemetryEvent::ControlResponse {
                ok: body.status == "success",
                message: body.message,
            })
        }
        other => Err(CodecError::unknown(other)),
    }
}

/// Decode raw frame bytes.  Rejects invalid UTF-8 before parsing.
pub fn decode_bytes(bytes: &[u8]) -> Result<TelemetryEvent, CodecError> {
    let text = core::str::from_utf8(bytes).map_err(|_| CodecError::Malformed("not UTF-8"))?;
    decode(text)
}

// ── Helpers ──────────────────────────────────────────────────

/// Parse `text` as a JSON object and pull out its string `type`.
fn tagged_object(text: &str) -> Result<(String, Map<String, Value>), CodecError> {
    let value: Value =
        serde_json::from_str(text).map_err(|_| CodecError::Malformed("not JSON"))?;
    let Value::Object(map) = value else {
        return Err(CodecError::Malformed("not an object"));
    };
    let kind = match map.get("type") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(CodecError::Malformed("type is not a string")),
        None => return Err(CodecError::Malformed("missing type")),
    };
    Ok((kind, map))
}

fn fields<T: DeserializeOwned>(value: Value) -> Result<T, CodecError> {
    serde_json::from_value(value).map_err(|_| CodecError::Malformed("bad field types"))
}
