//! Text protocol for Pokerforge.
//!
//! This crate defines the "language" the server speaks with a plain
//! terminal client:
//!
//! - **Input** ([`HostInput`], [`EstimateInput`]): how a trimmed line of
//!   client input is interpreted at each prompt.
//! - **Text** ([`text`]): every server-to-client message, rendered as
//!   UTF-8 text ready to be written to the socket.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (lines of text) and the
//! session coordinator. It doesn't know about connections or rooms;
//! it only knows what the words on the wire mean.
//!
//! ```text
//! Transport (lines) → Protocol (inputs / messages) → Session (state machine)
//! ```

mod input;
pub mod text;

pub use input::{EstimateInput, HostInput, EXIT_COMMAND, START_COMMAND};
pub use text::{ANSI_CLEAR_SCREEN, SPINNER_FRAMES};
