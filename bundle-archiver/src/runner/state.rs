//! Run lifecycle states.

use std::fmt;
use tracing::debug;

/// Phase of a run.
///
/// `Idle → Detecting → (Archiving → Committing → CoolingDown)* → Notifying → Done`,
/// or `Aborted` when bootstrapping fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Detecting,
    Archiving,
    Committing,
    CoolingDown,
    Notifying,
    Done,
    Aborted,
}

impl RunState {
    /// Returns the state as a string for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Detecting => "detecting",
            Self::Archiving => "archiving",
            Self::Committing => "committing",
            Self::CoolingDown => "cooling_down",
            Self::Notifying => "notifying",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Returns true if the run has finished.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Moves to `next`, logging the change.
    pub(crate) fn advance(&mut self, next: RunState) {
        if *self != next {
            debug!(from = self.as_str(), to = next.as_str(), "Run state changed");
            *self = next;
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
