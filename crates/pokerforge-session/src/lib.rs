//! Participant sessions for Pokerforge.
//!
//! This crate drives a single connected participant through the
//! planning-poker protocol:
//!
//! 1. **Joining**: pick a room (joining it, or creating it and becoming
//!    host), then pick a display name
//! 2. **Awaiting start**: the host types `start`; everyone else waits
//! 3. **Rounds**: estimate, wait for the others, see the results, repeat
//!    until the participant types `exit` or disconnects
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)  ← hands each connection's line channels to the coordinator
//!     ↕
//! Session Layer (this crate)  ← one state machine per participant
//!     ↕
//! Room Layer (below)  ← shared membership, estimates, and waits
//! ```

mod config;
mod coordinator;
mod error;
mod participant;

pub use config::SessionConfig;
pub use coordinator::{SessionCoordinator, SessionOutcome};
pub use error::SessionError;
pub use participant::{ClientReceiver, Participant};
