//! carlink console: host entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  WsTransport      ReqwestHttpControl   LogConsoleUi          │
//! │  (Transport)      (HttpControlPort)    (ConsoleUi)           │
//! │  EnvConfigAdapter MonotonicClock                             │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  LinkSession                                           │  │
//! │  │  Connection · Codec · Dispatcher · Router · Pollers     │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  stdin reader thread ──CONSOLE_CHANNEL──▶ link loop          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::io::BufRead;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use carlink::adapters::env_config::EnvConfigAdapter;
use carlink::adapters::http_control::ReqwestHttpControl;
use carlink::adapters::log_sink::LogConsoleUi;
use carlink::adapters::time::MonotonicClock;
use carlink::adapters::ws_transport::WsTransport;
use carlink::app::commands::{ConsoleRequest, ParseError};
use carlink::app::ports::ConfigPort;
use carlink::app::session::LinkSession;
use carlink::config::LinkConfig;
use carlink::link::{channels, io_task};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, http) = startup().context("starting console")?;
    info!(
        "carlink v{} | ws={} | http={}",
        env!("CARGO_PKG_VERSION"),
        config.ws_url(),
        config.http_base()
    );

    let transport = WsTransport::new(Duration::from_millis(config.connect_timeout_ms));

    let mut session = LinkSession::new(config, transport, http);
    let mut ui = LogConsoleUi::new();

    spawn_console_reader().context("spawning console reader")?;
    io_task::run(&mut session, &mut ui, MonotonicClock::new());

    info!("carlink: bye");
    Ok(())
}

/// Load and validate the configuration, then build the HTTP client.
fn startup() -> carlink::error::Result<(LinkConfig, ReqwestHttpControl)> {
    let config = EnvConfigAdapter::new().load()?;
    let http = ReqwestHttpControl::new(
        config.http_base(),
        Duration::from_millis(config.http_timeout_ms),
    )?;
    Ok((config, http))
}

/// Feed stdin lines into the link loop.  EOF quits.
fn spawn_console_reader() -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console".into())
        .spawn(|| {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match ConsoleRequest::parse(&line) {
                    Ok(request) => {
                        let quit = matches!(request, ConsoleRequest::Quit);
                        channels::submit(request);
                        if quit {
                            return;
                        }
                    }
                    Err(ParseError::Empty) => {}
                    Err(e) => warn!("Console: {}: '{}'", e, line.trim()),
                }
            }
            channels::submit(ConsoleRequest::Quit);
        })
}
