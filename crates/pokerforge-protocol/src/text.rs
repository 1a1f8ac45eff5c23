//! Server-to-client messages.
//!
//! Every function returns the exact text written to the client, newlines
//! included. Prompts deliberately omit the trailing newline so the cursor
//! stays on the prompt line.

/// Clears the terminal and moves the cursor home.
pub const ANSI_CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Frames of the liveness indicator shown while waiting.
pub const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

const SEPARATOR_WIDTH: usize = 50;

pub fn welcome() -> String {
    format!("{ANSI_CLEAR_SCREEN}Welcome to the planning poker server!\n")
}

pub fn room_prompt() -> &'static str {
    "Enter the room number you want to join: "
}

pub fn joined_room(room: &str) -> String {
    format!("Joined room {room}.\n")
}

pub fn created_room(room: &str) -> String {
    format!("Room {room} created where you are the host.\n")
}

pub fn session_already_started() -> &'static str {
    "The session has already started. Please try again later.\n"
}

pub fn capacity_exceeded(capacity: usize) -> String {
    format!(
        "The server is already hosting the maximum of {capacity} rooms. Please try again later.\n"
    )
}

pub fn room_closed() -> &'static str {
    "The room was closed. Please try again.\n"
}

pub fn name_prompt() -> &'static str {
    "Enter your name: "
}

pub fn name_taken(name: &str) -> String {
    format!("The name {name} is already taken in this room.\n")
}

pub fn member_joined(name: &str) -> String {
    format!("{name} joined the room.\n")
}

pub fn start_prompt() -> &'static str {
    "Type 'start' anytime to begin the session (wait for the other players).\n"
}

pub fn waiting_for_host() -> &'static str {
    "Waiting for host to start the session...\n"
}

pub fn host_left() -> &'static str {
    "\nThe host left before starting the session.\n"
}

pub fn spinner_frame(tick: usize) -> String {
    format!("\r{}", SPINNER_FRAMES[tick % SPINNER_FRAMES.len()])
}

pub fn round_header(round: u32) -> String {
    format!("+++ Round {round} +++\n")
}

pub fn estimate_prompt() -> &'static str {
    "Enter your estimate: "
}

pub fn waiting_for_estimates() -> &'static str {
    "Waiting for other players to estimate..."
}

/// Renders a completed round: screen clear, header, one line per
/// `(name, estimate)` pair in the given order, then a separator.
pub fn round_results(round: u32, estimates: &[(String, String)]) -> String {
    let mut out = format!(
        "{ANSI_CLEAR_SCREEN}All estimates received for Round {round}.\n\nEstimates are:\n"
    );
    for (name, estimate) in estimates {
        out.push_str(&format!("- {name}: {estimate}\n"));
    }
    out.push_str("Round finished.\n");
    out.push_str(&"-".repeat(SEPARATOR_WIDTH));
    out.push_str("\n\n\n");
    out
}

pub fn bye() -> &'static str {
    "\nBye bye!\n"
}

pub fn member_left(name: &str) -> String {
    format!("\n{name} left the room.\n")
}

pub fn name_replaced(name: &str) -> String {
    format!("\nSomeone else joined as {name}, so you have left the room.\n")
}

pub fn timed_out() -> &'static str {
    "\nNo activity for too long, closing the connection.\n"
}
