//! Error types for the session layer.

use std::time::Duration;

use pokerforge_room::RoomError;

/// Errors that end a participant's session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The participant's connection is gone (read EOF or failed write).
    /// Treated exactly like typing `exit`.
    #[error("participant disconnected")]
    Disconnected,

    /// Nothing happened within the configured wait timeout.
    #[error("no activity within {0:?}")]
    TimedOut(Duration),

    /// The room refused or ended the participation.
    #[error(transparent)]
    Room(#[from] RoomError),
}
