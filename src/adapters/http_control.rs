//! HTTP control adapter backed by `reqwest`'s blocking client.
//!
//! Each call is bounded by the configured timeout, so a dead peer stalls
//! the link loop for at most that long.

use std::time::Duration;

use log::debug;

use crate::app::ports::HttpControlPort;
use crate::error::HttpControlError;

pub struct ReqwestHttpControl {
    client: reqwest::blocking::Client,
    base: String,
}

impl ReqwestHttpControl {
    /// `base` is `http://host:port` without a trailing slash.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, HttpControlError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpControlError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base: base.into(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl HttpControlPort for ReqwestHttpControl {
    fn get(&mut self, path: &str, query: &[(&str, String)]) -> Result<u16, HttpControlError> {
        let url = format!("{}{}", self.base, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| HttpControlError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        debug!("HTTP: GET {} -> {}", response.url(), status);
        Ok(status)
    }
}
