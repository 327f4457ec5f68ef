//! carlink: realtime control/telemetry link for the vehicle console.
//!
//! Exposes the link core, the session, and the host adapters for the
//! binary and for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod link;
