//! Interpretation of client input lines.
//!
//! Lines arrive already trimmed by the transport, so matching is exact.

/// The literal the host types to begin the session.
pub const START_COMMAND: &str = "start";

/// The literal a participant types instead of an estimate to leave.
pub const EXIT_COMMAND: &str = "exit";

/// What the host typed at the start prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostInput {
    /// The start command.
    Start,
    /// Anything else. The host is prompted again.
    Other(String),
}

impl HostInput {
    pub fn parse(line: &str) -> Self {
        if line == START_COMMAND {
            Self::Start
        } else {
            Self::Other(line.to_string())
        }
    }
}

/// What a participant typed at the estimate prompt.
///
/// Estimates are free-form: no validation against a card deck is done,
/// and an empty line is a (blank) estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimateInput {
    /// The exit command: the participant leaves the room.
    Exit,
    /// An estimate for the current round.
    Estimate(String),
}

impl EstimateInput {
    pub fn parse(line: &str) -> Self {
        if line == EXIT_COMMAND {
            Self::Exit
        } else {
            Self::Estimate(line.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_input_start_is_exact() {
        assert_eq!(HostInput::parse("start"), HostInput::Start);
        assert_eq!(
            HostInput::parse("Start"),
            HostInput::Other("Start".into())
        );
        assert_eq!(
            HostInput::parse("start now"),
            HostInput::Other("start now".into())
        );
    }

    #[test]
    fn test_estimate_input_exit() {
        assert_eq!(EstimateInput::parse("exit"), EstimateInput::Exit);
    }

    #[test]
    fn test_estimate_input_accepts_any_text() {
        assert_eq!(
            EstimateInput::parse("13"),
            EstimateInput::Estimate("13".into())
        );
        assert_eq!(
            EstimateInput::parse("coffee?"),
            EstimateInput::Estimate("coffee?".into())
        );
        assert_eq!(EstimateInput::parse(""), EstimateInput::Estimate(String::new()));
    }
}
