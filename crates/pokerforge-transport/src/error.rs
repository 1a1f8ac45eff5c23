//! Errors raised by the TCP line transport.

use std::io;

/// A failure on the listener or on one client's socket.
///
/// Socket-level failures on a single client end only that client's
/// session; the accept loop logs [`AcceptFailed`](Self::AcceptFailed)
/// and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be bound to the requested address.
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept a connection: {0}")]
    AcceptFailed(#[source] io::Error),

    /// Writing to the client failed; it is treated as gone.
    #[error("failed to write to client: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("failed to read a line from client: {0}")]
    ReadFailed(#[source] io::Error),
}
