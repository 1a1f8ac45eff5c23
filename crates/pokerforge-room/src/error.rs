//! Error types for the room layer.

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Creating another room would exceed the registry's capacity.
    #[error("room capacity of {0} exceeded")]
    CapacityExceeded(usize),

    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(String),

    /// An open room with this id already exists.
    #[error("room {0} already exists")]
    AlreadyExists(String),

    /// The room's session has begun; no more members may join.
    #[error("session in room {0} has already started")]
    SessionAlreadyStarted(String),

    /// The room was torn down (emptied, or abandoned by its host).
    #[error("room {0} is closed")]
    Closed(String),

    /// Another member of the room already uses this name.
    #[error("name {0} is already taken")]
    NameTaken(String),

    /// A member's outbound sink is gone (its connection died).
    #[error("member {0} is unreachable")]
    PeerUnreachable(String),

    /// A later join took over this member's name.
    #[error("member {0} was replaced by a later join")]
    Replaced(String),

    /// The host left the room before starting the session.
    #[error("host left room {0} before the session started")]
    HostLeft(String),
}
