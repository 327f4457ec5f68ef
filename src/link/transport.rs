//! Transport abstraction: any text-frame duplex channel.
//!
//! Concrete implementations:
//! - WebSocket client over TCP ([`WsTransport`](crate::adapters::ws_transport::WsTransport))
//! - scripted mocks in the integration tests
//!
//! The [`ConnectionManager`](super::connection::ConnectionManager) is
//! generic over `Transport`, so a new channel needs zero changes to the
//! link logic.

use crate::error::TransportError;

/// Something that happened on the channel since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The channel finished opening.
    Opened,
    /// One complete inbound text frame.
    Message(String),
    /// The peer closed the channel.
    Closed,
    /// The channel failed; it is no longer usable.
    Error(String),
}

/// Text-frame duplex channel.
pub trait Transport {
    /// Begin opening a channel to `url`.
    ///
    /// A synchronous failure is returned directly.  Success may be reported
    /// immediately as [`TransportEvent::Opened`] on the next poll, or later.
    fn open(&mut self, url: &str) -> Result<(), TransportError>;

    /// Write one text frame.
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Return the next pending event without blocking.
    fn poll_event(&mut self) -> Option<TransportEvent>;

    /// Close the channel.  Safe to call when already closed.
    fn close(&mut self);
}
