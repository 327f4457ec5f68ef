//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements       | Connects to                |
//! |----------------|------------------|----------------------------|
//! | `ws_transport` | Transport        | Peer WebSocket (tungstenite)|
//! | `http_control` | HttpControlPort  | Peer `/control`, `/pid`    |
//! | `log_sink`     | ConsoleUi        | `log` output               |
//! | `env_config`   | ConfigPort       | Environment + JSON file    |
//! | `time`         | (clock)          | `std::time::Instant`       |

pub mod env_config;
pub mod http_control;
pub mod log_sink;
pub mod time;
pub mod ws_transport;
