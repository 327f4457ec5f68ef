//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one slice of the link
//! against mock adapters.  Everything runs on the host with no peer.

mod http_control_tests;
mod io_loop_tests;
mod session_tests;
