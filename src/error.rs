//! Unified error types for the console link.
//!
//! Each subsystem has its own small error enum, contained at the component
//! that detects it.  Only startup failures (config, HTTP client) escalate
//! into the top-level [`Error`] the binary reports before exiting.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Failures that stop the console before the link loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The HTTP control client could not be built.
    Http(HttpControlError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failures reported by the underlying duplex channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The channel could not be opened (TCP connect or handshake).
    Open(String),
    /// A frame could not be written.
    Send(String),
    /// The channel is not open.
    Closed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(reason) => write!(f, "open failed: {reason}"),
            Self::Send(reason) => write!(f, "send failed: {reason}"),
            Self::Closed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// `send` was called while the link was not `Connected`.
    NotConnected,
    /// The transport failed mid-send; the link is now reconnecting.
    Transport(TransportError),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<TransportError> for LinkError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

/// Longest discriminant kept verbatim in [`CodecError::UnknownType`].
pub const MAX_TYPE_NAME: usize = 32;

/// Inbound parse failures.  Always recovered locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Well-formed message with a `type` this console does not know.
    UnknownType(heapless::String<MAX_TYPE_NAME>),
    /// Not JSON, not an object, missing `type`, or badly typed fields.
    Malformed(&'static str),
}

impl CodecError {
    /// Build an `UnknownType`, truncating the name on a char boundary.
    pub fn unknown(name: &str) -> Self {
        let mut s = heapless::String::new();
        for ch in name.chars() {
            if s.push(ch).is_err() {
                break;
            }
        }
        Self::UnknownType(s)
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType(name) => write!(f, "unknown message type '{name}'"),
            Self::Malformed(reason) => write!(f, "malformed message: {reason}"),
        }
    }
}

impl std::error::Error for CodecError {}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The link is not `Connected`; nothing was sent.
    LinkDown,
    /// The outbound token bucket is empty.
    RateLimited,
    /// A command field is out of range.
    Invalid(&'static str),
    /// The channel rejected the frame.
    Link(LinkError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkDown => write!(f, "link is down"),
            Self::RateLimited => write!(f, "command rate limit exceeded"),
            Self::Invalid(reason) => write!(f, "invalid command: {reason}"),
            Self::Link(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<LinkError> for DispatchError {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// HTTP control errors
// ---------------------------------------------------------------------------

/// Failures on the `/control` and `/pid` request surface.  Surfaced to the
/// user directly and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpControlError {
    /// The peer answered with a non-2xx status.
    Status(u16),
    /// The request never produced a response (connect, timeout, ...).
    Request(String),
}

impl fmt::Display for HttpControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "peer returned HTTP {code}"),
            Self::Request(reason) => write!(f, "request failed: {reason}"),
        }
    }
}

impl std::error::Error for HttpControlError {}

impl From<HttpControlError> for Error {
    fn from(e: HttpControlError) -> Self {
        Self::Http(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
