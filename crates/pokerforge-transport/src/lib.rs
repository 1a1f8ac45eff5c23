//! Transport abstraction layer for Pokerforge.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! how participants reach the server. The only implementation is a
//! line-oriented text protocol over raw TCP ([`TcpLineTransport`]), which
//! is what `telnet`/`nc` clients speak.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{TcpLineConnection, TcpLineTransport, MAX_LINE_LEN};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that exchanges lines of text.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends text to the remote peer as-is (no newline is appended).
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the next line from the remote peer, trimmed of
    /// surrounding whitespace.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv_line(&self) -> Result<Option<String>, Self::Error>;

    /// Closes the sending side of the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
