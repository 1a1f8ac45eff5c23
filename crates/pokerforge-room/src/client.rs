//! A participant's identity and output channel.

use tokio::sync::mpsc;

use crate::RoomError;

/// Channel sender delivering text to a participant's connection writer.
pub type ClientSender = mpsc::UnboundedSender<String>;

/// Identity and outbound sink of one connected participant.
///
/// Cheap to clone: clones share the same outbound channel, so a clone held
/// by the [`Room`](crate::Room) delivers to the same connection as the one
/// held by the participant's own task.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    name: String,
    is_host: bool,
    outbound: ClientSender,
}

impl ClientHandle {
    pub fn new(name: impl Into<String>, is_host: bool, outbound: ClientSender) -> Self {
        Self {
            name: name.into(),
            is_host,
            outbound,
        }
    }

    /// The display name, unique within a room.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` iff this participant created the room.
    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Queues text for delivery.
    ///
    /// # Errors
    /// Returns [`RoomError::PeerUnreachable`] if the connection's writer
    /// has gone away.
    pub fn send(&self, text: impl Into<String>) -> Result<(), RoomError> {
        self.outbound
            .send(text.into())
            .map_err(|_| RoomError::PeerUnreachable(self.name.clone()))
    }

    /// `true` if both handles deliver to the same connection.
    pub fn same_registration(&self, other: &ClientHandle) -> bool {
        self.outbound.same_channel(&other.outbound)
    }
}
