//! Room registry: creates, tracks, and hands out rooms by id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{RegistryConfig, Room, RoomError};

/// Result of [`RoomRegistry::join_or_create`].
pub struct JoinedRoom {
    pub room: Arc<Room>,
    /// `true` if this call created the room (the caller becomes host).
    pub created: bool,
}

/// Capacity-bounded collection of open rooms, keyed by room id.
///
/// Constructed once at server start and shared by every connection task.
/// The registry lock guards only creation and lookup; it is never held
/// while a room's own lock is taken, so the two can't deadlock.
///
/// Rooms that close (see [`Room::is_closed`]) stop counting against the
/// capacity and are purged on the next creation.
pub struct RoomRegistry {
    config: RegistryConfig,
    rooms: Mutex<HashMap<String, Arc<Room>>>,
}

impl RoomRegistry {
    /// Creates a new, empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Maximum number of open rooms.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Creates a room.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyExists`] if an open room has this id.
    /// - [`RoomError::CapacityExceeded`] if the registry is full; nothing
    ///   is created.
    pub async fn create(&self, id: &str) -> Result<Arc<Room>, RoomError> {
        let mut rooms = self.rooms.lock().await;
        purge_closed(&mut rooms);
        if rooms.contains_key(id) {
            return Err(RoomError::AlreadyExists(id.to_string()));
        }
        self.insert_locked(&mut rooms, id)
    }

    /// Returns the open room with this id.
    pub async fn lookup(&self, id: &str) -> Result<Arc<Room>, RoomError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(id)
            .filter(|room| !room.is_closed())
            .cloned()
            .ok_or_else(|| RoomError::NotFound(id.to_string()))
    }

    pub async fn exists(&self, id: &str) -> bool {
        self.lookup(id).await.is_ok()
    }

    /// Returns the open room with this id, creating it if there is none.
    ///
    /// Lookup and creation happen under one lock hold: when several
    /// connections race to create the same id, exactly one gets
    /// `created == true` and the rest receive that same room.
    ///
    /// # Errors
    /// [`RoomError::CapacityExceeded`] if the room would have to be created
    /// and the registry is full.
    pub async fn join_or_create(
        &self,
        id: &str,
    ) -> Result<JoinedRoom, RoomError> {
        let mut rooms = self.rooms.lock().await;
        if let Some(room) = rooms.get(id).filter(|room| !room.is_closed()) {
            return Ok(JoinedRoom {
                room: Arc::clone(room),
                created: false,
            });
        }

        purge_closed(&mut rooms);
        let room = self.insert_locked(&mut rooms, id)?;
        Ok(JoinedRoom {
            room,
            created: true,
        })
    }

    fn insert_locked(
        &self,
        rooms: &mut HashMap<String, Arc<Room>>,
        id: &str,
    ) -> Result<Arc<Room>, RoomError> {
        if rooms.len() >= self.config.capacity {
            tracing::warn!(
                room = id,
                capacity = self.config.capacity,
                "room capacity exceeded"
            );
            return Err(RoomError::CapacityExceeded(self.config.capacity));
        }

        let room = Arc::new(Room::new(id));
        rooms.insert(id.to_string(), Arc::clone(&room));
        tracing::info!(room = id, rooms = rooms.len(), "room created");
        Ok(room)
    }

    /// Removes `room` from the registry.
    ///
    /// Only removes the entry if it is this very room, not a newer room
    /// that has since been created under the same id.
    pub async fn remove(&self, room: &Arc<Room>) -> bool {
        let mut rooms = self.rooms.lock().await;
        let same = rooms
            .get(room.id())
            .is_some_and(|existing| Arc::ptr_eq(existing, room));
        if same {
            rooms.remove(room.id());
            tracing::info!(room = room.id(), rooms = rooms.len(), "room removed");
        }
        same
    }

    /// Returns the number of open rooms.
    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.values().filter(|room| !room.is_closed()).count()
    }

    /// Lists the ids of all open rooms, sorted.
    pub async fn room_ids(&self) -> Vec<String> {
        let rooms = self.rooms.lock().await;
        let mut ids: Vec<String> = rooms
            .iter()
            .filter(|(_, room)| !room.is_closed())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

fn purge_closed(rooms: &mut HashMap<String, Arc<Room>>) {
    rooms.retain(|_, room| !room.is_closed());
}
