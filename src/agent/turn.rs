//! Outcome of a single turn through the agent loop.

/// What happened during one turn.
///
/// A turn never escapes the loop as an `Err`: provider failures are
/// recorded in the conversation as a system diagnostic and surfaced here
/// through [`TurnOutcome::error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Provider rounds consumed (tool rounds included).
    pub rounds: usize,
    /// True when the loop stopped only because the round budget ran out.
    pub exhausted: bool,
    /// Provider failure that terminated the turn, if any.
    pub error: Option<String>,
}

impl TurnOutcome {
    pub(crate) fn completed(rounds: usize) -> Self {
        Self {
            rounds,
            exhausted: false,
            error: None,
        }
    }

    pub(crate) fn exhausted(rounds: usize) -> Self {
        Self {
            rounds,
            exhausted: true,
            error: None,
        }
    }

    pub(crate) fn failed(rounds: usize, error: String) -> Self {
        Self {
            rounds,
            exhausted: false,
            error: Some(error),
        }
    }

    /// True when the turn ended with a final assistant reply and no error.
    pub fn is_clean(&self) -> bool {
        !self.exhausted && self.error.is_none()
    }
}
