//! # Pokerforge
//!
//! Multi-room planning poker over a raw text socket.
//!
//! Clients connect with any line-oriented terminal tool (`telnet`, `nc`),
//! join a named room, and estimate round after round. The first client
//! into a room is its host and starts the session; each round's results
//! are shown to everyone once all current members have estimated.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pokerforge::prelude::*;
//!
//! # async fn run() -> Result<(), PokerError> {
//! let server = PokerServer::builder()
//!     .bind("0.0.0.0:2222")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::PokerError;
pub use server::{PokerServer, PokerServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{PokerError, PokerServer, PokerServerBuilder};
    pub use pokerforge_room::{RegistryConfig, RoomError, RoomRegistry};
    pub use pokerforge_session::{
        SessionConfig, SessionCoordinator, SessionError, SessionOutcome,
    };
    pub use pokerforge_transport::TransportError;
}
