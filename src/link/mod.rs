//! Realtime control/telemetry link to the vehicle.
//!
//! ```text
//! Command ─▶ dispatcher ─▶ codec::encode ─▶ connection ─▶ Transport ─▶ wire
//! wire ─▶ Transport ─▶ connection ─▶ codec::decode ─▶ router ─▶ ConsoleUi
//! ```
//!
//! While the channel is down, [`fallback`] keeps the dashboard alive with
//! simulated values; while it is up, [`status_poll`] asks the peer for
//! fresh ones.

pub mod channels;
pub mod codec;
pub mod connection;
pub mod dispatcher;
pub mod fallback;
pub mod io_task;
pub mod router;
pub mod status_poll;
pub mod telemetry;
pub mod transport;
