//! Outbound command gate.
//!
//! Every command passes four checks in order:
//!
//! 1. **Link gating**: nothing reaches the channel unless it is `Connected`.
//! 2. **Validation**: drive values and PID gains must be in range.
//! 3. **Rate limiting**: a token bucket shared by the whole session.
//!    `EmergencyStop` bypasses it.
//! 4. **Hand-off**: encode and send, in call order.
//!
//! Repeated identical `Move`s are sent as-is; the peer treats them as a
//! continuous stream.

use core::time::Duration;
use std::sync::OnceLock;
use std::time::Instant;

use burster::Limiter;
use log::{debug, warn};

use super::codec;
use super::connection::{FrameSink, LinkState};
use crate::app::commands::{Command, PidParameters};
use crate::error::DispatchError;

/// Drive speed limit, both wheels, both directions.
pub const MAX_SPEED: i32 = 100;
/// Steering limit in degrees either side of centre.
pub const MAX_TURN_ANGLE_DEG: i32 = 90;

pub struct Dispatcher {
    limiter: burster::TokenBucket<fn() -> Duration>,
}

impl Dispatcher {
    /// `rate_per_sec` and `burst` of zero are raised to one.
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            limiter: burster::TokenBucket::new_with_time_provider(
                rate_per_sec.max(1).into(),
                burst.max(1).into(),
                monotonic_now as fn() -> Duration,
            ),
        }
    }

    pub fn dispatch(&mut self, cmd: &Command, sink: &mut dyn FrameSink) -> Result<(), DispatchError> {
        if sink.link_state() != LinkState::Connected {
            debug!("Dispatch: {} dropped, link {}", cmd.name(), sink.link_state());
            return Err(DispatchError::LinkDown);
        }

        validate(cmd)?;

        if !matches!(cmd, Command::EmergencyStop) && self.limiter.try_consume(1).is_err() {
            warn!("Dispatch: {} rate limited", cmd.name());
            return Err(DispatchError::RateLimited);
        }

        sink.send_frame(&codec::encode(cmd))?;
        debug!("Dispatch: sent {}", cmd.name());
        Ok(())
    }
}

fn monotonic_now() -> Duration {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}

/// Range checks the codec does not perform.
pub fn validate(cmd: &Command) -> Result<(), DispatchError> {
    match *cmd {
        Command::Move {
            turn_angle_deg,
            left_speed,
            right_speed,
        } => {
            let speed_range = -MAX_SPEED..=MAX_SPEED;
            if !speed_range.contains(&left_speed) || !speed_range.contains(&right_speed) {
                return Err(DispatchError::Invalid("speed out of range"));
            }
            if !(-MAX_TURN_ANGLE_DEG..=MAX_TURN_ANGLE_DEG).contains(&turn_angle_deg) {
                return Err(DispatchError::Invalid("turn angle out of range"));
            }
        }
        Command::SetPid { kp, ki, kd, .. } => {
            if !(PidParameters { kp, ki, kd }).is_valid() {
                return Err(DispatchError::Invalid("PID gains must be finite and >= 0"));
            }
        }
        Command::Start | Command::Stop | Command::Beep | Command::EmergencyStop => {}
    }
    Ok(())
}
