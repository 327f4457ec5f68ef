//! Live status requests while connected.
//!
//! Sends `{"type":"get_status"}` on a fixed interval.  Replies come back
//! as ordinary `status_data` frames and are routed like any other.

use log::{debug, info};

use super::codec;
use super::connection::FrameSink;
use super::telemetry::TelemetryLink;
use crate::app::events::{StatusUpdate, TelemetrySnapshot};

pub struct StatusPoller {
    interval_ms: u64,
    next_request_at: Option<u64>,
    requests: u64,
}

impl StatusPoller {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_request_at: None,
            requests: 0,
        }
    }

    /// Requests sent since construction.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl TelemetryLink for StatusPoller {
    fn name(&self) -> &'static str {
        "live"
    }

    fn start(&mut self, now_ms: u64, _seed: &TelemetrySnapshot) {
        if self.next_request_at.is_none() {
            self.next_request_at = Some(now_ms.saturating_add(self.interval_ms));
            info!("Status: polling peer every {} ms", self.interval_ms);
        }
    }

    fn stop(&mut self) {
        self.next_request_at = None;
    }

    fn is_running(&self) -> bool {
        self.next_request_at.is_some()
    }

    fn poll(&mut self, now_ms: u64, sink: &mut dyn FrameSink) -> Option<StatusUpdate> {
        let at = self.next_request_at?;
        if now_ms < at {
            return None;
        }
        self.next_request_at = Some(now_ms.saturating_add(self.interval_ms));
        match sink.send_frame(&codec::encode_status_request()) {
            Ok(()) => self.requests += 1,
            Err(e) => debug!("Status: request not sent: {}", e),
        }
        None
    }
}
