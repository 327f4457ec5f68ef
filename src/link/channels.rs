//! Console-to-link channels.
//!
//! Uses `embassy-sync` primitives to bridge the blocking stdin reader
//! thread with the async link loop without shared locks.
//!
//! ```text
//! ┌──────────────┐ ConsoleRequest ┌──────────────┐
//! │ stdin reader │──────────────▶│  Link loop   │
//! │  (thread)    │               │  (async)     │
//! └──────────────┘               └──────┬───────┘
//!                        SHUTDOWN ◀─────┘ on Quit
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::warn;

use crate::app::commands::ConsoleRequest;

/// Requests buffered between the reader and the loop.
const CONSOLE_DEPTH: usize = 16;

/// Inbound request channel: console → link loop.
pub static CONSOLE_CHANNEL: Channel<CriticalSectionRawMutex, ConsoleRequest, CONSOLE_DEPTH> =
    Channel::new();

/// Raised once when the link loop should exit.
pub static SHUTDOWN: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Queue a request without blocking.  Returns `false` if the channel is full.
pub fn submit(request: ConsoleRequest) -> bool {
    if CONSOLE_CHANNEL.try_send(request).is_err() {
        warn!("Console: request channel full, dropping request");
        return false;
    }
    true
}

/// Ask the link loop to stop after its current step.
pub fn request_shutdown() {
    SHUTDOWN.signal(());
}
