//! Unified error type for Pokerforge.

use pokerforge_room::RoomError;
use pokerforge_session::SessionError;
use pokerforge_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PokerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A room-level error (capacity, not found, already started).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A session-level error (disconnect, timeout).
    #[error(transparent)]
    Session(#[from] SessionError),
}
