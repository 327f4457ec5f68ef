//! Environment-driven configuration adapter.
//!
//! Resolution order, later wins:
//!
//! 1. [`LinkConfig::default()`]
//! 2. JSON file named by `CARLINK_CONFIG` (missing fields keep defaults)
//! 3. `CARLINK_HOST`, `CARLINK_WS_PORT`, `CARLINK_HTTP_PORT`
//!
//! The result is validated before it is returned.

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::LinkConfig;

pub const CONFIG_FILE_VAR: &str = "CARLINK_CONFIG";
pub const HOST_VAR: &str = "CARLINK_HOST";
pub const WS_PORT_VAR: &str = "CARLINK_WS_PORT";
pub const HTTP_PORT_VAR: &str = "CARLINK_HTTP_PORT";

/// Reads configuration from the process environment.
#[derive(Debug, Default)]
pub struct EnvConfigAdapter;

impl EnvConfigAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Same resolution as [`ConfigPort::load`], with an injected variable
    /// lookup and file reader.
    pub fn load_with(
        lookup: impl Fn(&str) -> Option<String>,
        read_file: impl Fn(&str) -> std::io::Result<String>,
    ) -> Result<LinkConfig, ConfigError> {
        let mut config = match lookup(CONFIG_FILE_VAR) {
            Some(path) => {
                let text = read_file(&path).map_err(|_| ConfigError::NotFound)?;
                let config: LinkConfig =
                    serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
                info!("Config: loaded {}", path);
                config
            }
            None => LinkConfig::default(),
        };

        if let Some(host) = lookup(HOST_VAR) {
            config.host = host;
        }
        if let Some(port) = lookup(WS_PORT_VAR) {
            config.ws_port = parse_port(&port, "CARLINK_WS_PORT must be a port number")?;
        }
        if let Some(port) = lookup(HTTP_PORT_VAR) {
            config.http_port = parse_port(&port, "CARLINK_HTTP_PORT must be a port number")?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_port(text: &str, reason: &'static str) -> Result<u16, ConfigError> {
    text.trim()
        .parse()
        .map_err(|_| ConfigError::ValidationFailed(reason))
}

fn read_config_file(path: &str) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

impl ConfigPort for EnvConfigAdapter {
    fn load(&self) -> Result<LinkConfig, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok(), read_config_file)
    }
}
