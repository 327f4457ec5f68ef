//! WebSocket transport over a plain TCP stream.
//!
//! Implements [`Transport`] with `tungstenite`'s synchronous client.
//!
//! ## Lifecycle
//!
//! 1. `open()` connects with a timeout and performs the handshake in
//!    blocking mode, then switches the socket to non-blocking.
//! 2. `poll_event()` reads at most one frame per call; `WouldBlock` simply
//!    means nothing has arrived.
//! 3. Any read error other than `WouldBlock` drops the socket and reports
//!    `Closed` or `Error` exactly once.
//!
//! Ping/pong is handled inside `tungstenite` on read.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info, warn};
use tungstenite::http::Uri;
use tungstenite::{Message, WebSocket};

use crate::error::TransportError;
use crate::link::transport::{Transport, TransportEvent};

pub struct WsTransport {
    socket: Option<WebSocket<TcpStream>>,
    pending: VecDeque<TransportEvent>,
    connect_timeout: Duration,
}

impl WsTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            socket: None,
            pending: VecDeque::new(),
            connect_timeout,
        }
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn connect_stream(&self, url: &str) -> Result<TcpStream, TransportError> {
        let uri: Uri = url
            .parse()
            .map_err(|e| TransportError::Open(format!("bad url {url}: {e}")))?;
        let host = uri
            .host()
            .ok_or_else(|| TransportError::Open(format!("no host in {url}")))?;
        let port = uri.port_u16().unwrap_or(80);

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| TransportError::Open(format!("resolve {host}: {e}")))?
            .next()
            .ok_or_else(|| TransportError::Open(format!("no address for {host}")))?;

        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout)
            .map_err(|e| TransportError::Open(e.to_string()))?;
        stream
            .set_read_timeout(Some(self.connect_timeout))
            .map_err(|e| TransportError::Open(e.to_string()))?;
        let _ = stream.set_nodelay(true);
        Ok(stream)
    }

    /// Drop the socket after a fatal read.
    fn drop_socket(&mut self, event: TransportEvent) -> Option<TransportEvent> {
        self.socket = None;
        Some(event)
    }
}

impl Transport for WsTransport {
    /// Blocking connect and handshake.  The TCP connect and each handshake
    /// read are bounded by the connect timeout, so a dead peer holds the
    /// link loop for up to about twice that before the open fails.
    fn open(&mut self, url: &str) -> Result<(), TransportError> {
        self.close();

        let stream = self.connect_stream(url)?;
        let (mut ws, response) = tungstenite::client(url, stream)
            .map_err(|e| TransportError::Open(format!("handshake: {e}")))?;
        ws.get_mut()
            .set_nonblocking(true)
            .map_err(|e| TransportError::Open(e.to_string()))?;

        info!("WS: connected to {} (HTTP {})", url, response.status().as_u16());
        self.socket = Some(ws);
        self.pending.push_back(TransportEvent::Opened);
        Ok(())
    }

    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        let ws = self.socket.as_mut().ok_or(TransportError::Closed)?;
        match ws.send(Message::Text(text.to_owned())) {
            Ok(()) => Ok(()),
            // Frame is buffered; flushed on the next read or send.
            Err(tungstenite::Error::Io(e)) if e.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(TransportError::Send(e.to_string())),
        }
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        let ws = self.socket.as_mut()?;

        match ws.read() {
            Ok(Message::Text(text)) => Some(TransportEvent::Message(text)),
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => Some(TransportEvent::Message(text)),
                Err(_) => {
                    warn!("WS: dropping non-UTF-8 binary frame");
                    None
                }
            },
            Ok(Message::Close(frame)) => {
                debug!("WS: close frame {:?}", frame);
                self.drop_socket(TransportEvent::Closed)
            }
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => None,
            Err(tungstenite::Error::Io(e)) if e.kind() == ErrorKind::WouldBlock => None,
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                self.drop_socket(TransportEvent::Closed)
            }
            Err(e) => self.drop_socket(TransportEvent::Error(e.to_string())),
        }
    }

    fn close(&mut self) {
        self.pending.clear();
        if let Some(mut ws) = self.socket.take() {
            let _ = ws.close(None);
            let _ = ws.flush();
            debug!("WS: closed");
        }
    }
}
