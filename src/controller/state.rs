//! Controller lifecycle state and pacing.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Play state of a [`ProceedingController`](super::ProceedingController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// No active proceeding.
    #[default]
    Idle,
    /// Advancing automatically.
    Running,
    /// Halted, resumable.
    Paused,
    /// The verdict phase is done.
    Completed,
}

impl ControllerState {
    /// Returns `true` for states in which a proceeding is live.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Returns `true` once nothing more will happen without a new call.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Idle | Self::Completed)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Delays between automatic steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Between start and the first turn.
    pub initial_delay: Duration,
    /// After a statement when the phase continues.
    pub turn_delay: Duration,
    /// After a phase advances.
    pub phase_delay: Duration,
    /// After resuming.
    pub resume_delay: Duration,
}

impl Pacing {
    /// Pacing with every delay set to zero.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            turn_delay: Duration::ZERO,
            phase_delay: Duration::ZERO,
            resume_delay: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            turn_delay: Duration::from_millis(1500),
            phase_delay: Duration::from_secs(1),
            resume_delay: Duration::from_millis(500),
        }
    }
}
