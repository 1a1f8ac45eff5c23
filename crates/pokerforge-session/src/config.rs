//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for participant sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound on any single wait: for the participant's own input,
    /// for the host to start, or for a round to complete. On expiry the
    /// participant leaves as if disconnected.
    ///
    /// `None` waits forever.
    pub wait_timeout: Option<Duration>,

    /// Interval of the spinner shown while waiting. `None` disables it.
    pub spinner_interval: Option<Duration>,

    /// Refuse a display name already used in the room instead of letting
    /// the newcomer replace the earlier member.
    pub reject_duplicate_names: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wait_timeout: None,
            spinner_interval: Some(Duration::from_millis(500)),
            reject_duplicate_names: false,
        }
    }
}
