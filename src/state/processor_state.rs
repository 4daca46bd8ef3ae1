/// Lifecycle state definitions for a processing run
use std::fmt;

/// Represents the current state of a processing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessorState {
    /// Input is still being read
    #[default]
    Running,

    /// Input has ended; queued tasks or armed retries are still outstanding
    Draining,

    /// Input has ended and every task and retry has resolved
    Complete,
}

impl ProcessorState {
    /// Returns true if no further work will happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Returns true if moving to `next` is a valid transition
    ///
    /// Runs only move forward. `Running` may jump straight to `Complete`
    /// when the input ends with nothing outstanding.
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Running, Self::Draining)
                | (Self::Running, Self::Complete)
                | (Self::Draining, Self::Complete)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
