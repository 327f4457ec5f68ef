//! Application core: session lifecycle and the console-facing ports.
//!
//! The vehicle link itself lives in [`crate::link`].  This layer owns the
//! [`LinkSession`](session::LinkSession) that wires link components to the
//! UI, plus the non-realtime HTTP control path.  All I/O goes through
//! **port traits** in [`ports`], so every rule here is testable with mocks.

pub mod commands;
pub mod control;
pub mod events;
pub mod ports;
pub mod session;
