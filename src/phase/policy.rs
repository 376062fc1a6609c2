//! Phase advancement policy
//!
//! Decides whether a phase is complete from its phase-scoped message count.
//! The controller asks after each append, passing the count that includes
//! the message just recorded.

use super::ledger::PhaseKey;

/// Number of counted statements after which `phase` is complete.
#[must_use]
pub const fn threshold(phase: PhaseKey) -> usize {
    match phase {
        PhaseKey::Opening | PhaseKey::Closing => 3,
        PhaseKey::Arguments | PhaseKey::CrossExamination => 6,
        PhaseKey::Deliberation => 1,
        PhaseKey::Verdict => 2,
    }
}

/// Returns `true` once `phase` has collected enough statements.
///
/// Monotonic in `phase_message_count`.
#[must_use]
pub const fn is_phase_complete(phase: PhaseKey, phase_message_count: usize) -> bool {
    phase_message_count >= threshold(phase)
}

/// Same as [`is_phase_complete`] for a phase given by key string.
///
/// Unknown keys never complete.
#[must_use]
pub fn is_phase_complete_for_key(phase: &str, phase_message_count: usize) -> bool {
    phase
        .parse::<PhaseKey>()
        .is_ok_and(|p| is_phase_complete(p, phase_message_count))
}
