//! Synthetic status while the duplex channel is down.
//!
//! Not real telemetry: a local simulation that keeps the dashboard moving.
//! Each tick adds one second of uptime and decays the battery estimate by
//! a fixed step until it reaches the floor.  Values never jump backwards.

use log::{debug, info};

use super::connection::FrameSink;
use super::telemetry::TelemetryLink;
use crate::app::events::{StatusUpdate, TelemetrySnapshot};
use crate::config::LinkConfig;

pub struct FallbackPoller {
    interval_ms: u64,
    seed_battery: f32,
    floor: f32,
    step: f32,
    next_tick_at: Option<u64>,
    uptime_seconds: u64,
    battery: f32,
}

impl FallbackPoller {
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            interval_ms: config.fallback_interval_ms.max(1),
            seed_battery: config.fallback_seed_battery,
            floor: config.fallback_battery_floor,
            step: config.fallback_battery_step,
            next_tick_at: None,
            uptime_seconds: 0,
            battery: config.fallback_seed_battery,
        }
    }

    /// Produce the next synthetic reading.
    pub fn tick(&mut self) -> StatusUpdate {
        self.uptime_seconds = self.uptime_seconds.saturating_add(1);
        if self.battery > self.floor {
            self.battery = (self.battery - self.step).max(self.floor);
        }
        StatusUpdate {
            current_speed: None,
            battery_level: Some(self.battery),
            uptime_seconds: Some(self.uptime_seconds),
            angle: None,
        }
    }
}

impl TelemetryLink for FallbackPoller {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn start(&mut self, now_ms: u64, seed: &TelemetrySnapshot) {
        if self.next_tick_at.is_some() {
            debug!("Fallback: already running");
            return;
        }
        self.uptime_seconds = seed.uptime_seconds.unwrap_or(0);
        self.battery = seed.battery_level.unwrap_or(self.seed_battery);
        self.next_tick_at = Some(now_ms.saturating_add(self.interval_ms));
        info!(
            "Fallback: simulating status from uptime {}s, battery {:.1}%",
            self.uptime_seconds, self.battery
        );
    }

    fn stop(&mut self) {
        if self.next_tick_at.take().is_some() {
            info!("Fallback: stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.next_tick_at.is_some()
    }

    /// Missed intervals are caught up; only the latest reading is returned.
    fn poll(&mut self, now_ms: u64, _sink: &mut dyn FrameSink) -> Option<StatusUpdate> {
        let mut latest = None;
        loop {
            match self.next_tick_at {
                Some(at) if now_ms >= at => {
                    latest = Some(self.tick());
                    self.next_tick_at = Some(at.saturating_add(self.interval_ms));
                }
                _ => break,
            }
        }
        latest
    }
}
