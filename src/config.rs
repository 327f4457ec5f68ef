//! Link configuration parameters
//!
//! All tunable parameters for the console link.
//! Values can be overridden from a JSON file or the environment
//! (see [`EnvConfigAdapter`](crate::adapters::env_config::EnvConfigAdapter)).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    // --- Peer ---
    /// Hostname or IP of the vehicle controller
    pub host: String,
    /// WebSocket control port
    pub ws_port: u16,
    /// HTTP control port (`/control`, `/pid`)
    pub http_port: u16,

    // --- Reconnect ---
    /// Fixed delay between a lost channel and the next open attempt (ms)
    pub reconnect_delay_ms: u64,
    /// TCP connect and handshake read timeout for a single open attempt (ms).
    /// An open runs on the link loop, so one attempt can stall it for up to
    /// about twice this value.  Must not exceed `reconnect_delay_ms`.
    pub connect_timeout_ms: u64,

    // --- Telemetry ---
    /// Live `get_status` request interval while connected (ms)
    pub status_poll_interval_ms: u64,
    /// Synthetic status interval while disconnected (ms)
    pub fallback_interval_ms: u64,
    /// Battery estimate used when no live reading has been seen (%)
    pub fallback_seed_battery: f32,
    /// Simulated battery never decays below this (%)
    pub fallback_battery_floor: f32,
    /// Simulated battery decay per fallback tick (%)
    pub fallback_battery_step: f32,

    // --- Dispatch ---
    /// Sustained outbound command rate (commands/s)
    pub dispatch_rate_per_sec: u32,
    /// Outbound burst capacity (commands)
    pub dispatch_burst: u32,

    // --- HTTP ---
    /// Per-request timeout on the HTTP surface (ms)
    pub http_timeout_ms: u64,

    // --- Timing ---
    /// Transport read / session tick interval of the link loop (ms)
    pub transport_poll_interval_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            // Peer
            host: "127.0.0.1".to_owned(),
            ws_port: 8765,
            http_port: 5000,

            // Reconnect
            reconnect_delay_ms: 3000,
            connect_timeout_ms: 2000,

            // Telemetry
            status_poll_interval_ms: 5000,
            fallback_interval_ms: 1000,
            fallback_seed_battery: 100.0,
            fallback_battery_floor: 20.0,
            fallback_battery_step: 0.1,

            // Dispatch
            dispatch_rate_per_sec: 20,
            dispatch_burst: 20,

            // HTTP
            http_timeout_ms: 2000,

            // Timing
            transport_poll_interval_ms: 10,
        }
    }
}

impl LinkConfig {
    /// WebSocket endpoint of the peer.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/", self.host, self.ws_port)
    }

    /// Base URL of the peer's HTTP control surface (no trailing slash).
    pub fn http_base(&self) -> String {
        format!("http://{}:{}", self.host, self.http_port)
    }

    /// Reject values that would stall or spin the link loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("host must not be empty"));
        }
        if self.ws_port == 0 || self.http_port == 0 {
            return Err(ConfigError::ValidationFailed("ports must be non-zero"));
        }
        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed("reconnect_delay_ms must be > 0"));
        }
        if self.connect_timeout_ms == 0 || self.connect_timeout_ms > self.reconnect_delay_ms {
            return Err(ConfigError::ValidationFailed(
                "connect_timeout_ms must be > 0 and <= reconnect_delay_ms",
            ));
        }
        if self.status_poll_interval_ms == 0
            || self.fallback_interval_ms == 0
            || self.transport_poll_interval_ms == 0
        {
            return Err(ConfigError::ValidationFailed("intervals must be > 0"));
        }
        if self.dispatch_rate_per_sec == 0 || self.dispatch_burst == 0 {
            return Err(ConfigError::ValidationFailed("dispatch rate and burst must be > 0"));
        }
        if !(0.0..=100.0).contains(&self.fallback_battery_floor)
            || !(0.0..=100.0).contains(&self.fallback_seed_battery)
        {
            return Err(ConfigError::ValidationFailed("battery values must be within 0-100"));
        }
        if !self.fallback_battery_step.is_finite() || self.fallback_battery_step < 0.0 {
            return Err(ConfigError::ValidationFailed("fallback_battery_step must be >= 0"));
        }
        Ok(())
    }
}
