//! Line-oriented text transport over raw TCP.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Maximum number of bytes consumed by a single [`recv_line`] call.
///
/// Longer input is split: the remainder is returned by the next call.
///
/// [`recv_line`]: Connection::recv_line
pub const MAX_LINE_LEN: u64 = 1024;

/// A TCP [`Transport`] that listens for incoming text connections.
pub struct TcpLineTransport {
    listener: TcpListener,
}

impl TcpLineTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| {
            TransportError::BindFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    ///
    /// Useful after binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpLineTransport {
    type Connection = TcpLineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = TcpLineConnection::new(stream, addr);
        tracing::debug!(id = %conn.id, %addr, "accepted TCP connection");
        Ok(conn)
    }
}

/// A single TCP connection carrying lines of text.
///
/// The read and write halves sit behind separate locks so one task can
/// block in [`recv_line`](Connection::recv_line) while another sends.
pub struct TcpLineConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpLineConnection {
    /// Wraps an accepted stream.
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            id: ConnectionId::new(
                NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            ),
            peer,
            reader: Mutex::new(BufReader::new(read_half)),
            writer: Mutex::new(write_half),
        }
    }

    /// Returns the remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for TcpLineConnection {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), Self::Error> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(text.as_bytes())
            .await
            .map_err(TransportError::WriteFailed)?;
        writer.flush().await.map_err(TransportError::WriteFailed)
    }

    async fn recv_line(&self) -> Result<Option<String>, Self::Error> {
        let mut reader = self.reader.lock().await;
        let mut limited = (&mut *reader).take(MAX_LINE_LEN);
        let mut buf = Vec::new();
        let read = limited
            .read_until(b'\n', &mut buf)
            .await
            .map_err(TransportError::ReadFailed)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).trim().to_string()))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::WriteFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
