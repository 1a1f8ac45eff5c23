//! Room coordination for Pokerforge.
//!
//! A room is the unit of synchronization: its membership, its
//! session-started flag and its round-by-round estimate ledger live behind
//! one lock, and every connection task that participates in the room
//! observes and mutates that state through [`Room`]'s methods.
//!
//! # Key types
//!
//! - [`ClientHandle`]: a participant's name, host flag and outbound sink
//! - [`Room`]: membership + estimate ledger + lifecycle flags, with
//!   notification-based waits for "session started" and "round complete"
//! - [`RoomRegistry`]: capacity-bounded map of room id → room
//! - [`RegistryConfig`]: registry settings (room capacity)

mod client;
mod config;
mod error;
mod registry;
mod room;

pub use client::{ClientHandle, ClientSender};
pub use config::RegistryConfig;
pub use error::RoomError;
pub use registry::{JoinedRoom, RoomRegistry};
pub use room::{Room, RoundResults};
