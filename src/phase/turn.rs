//! Turn selection
//!
//! Maps the current phase and its phase-scoped message count to the role
//! that speaks next. Pure: the same inputs always yield the same role.

use crate::court::{Participant, ParticipantRegistry, Role};

use super::ledger::PhaseKey;

/// Fixed order for opening and closing statements.
const STATEMENT_ORDER: [Role; 3] = [Role::Judge, Role::CounselPlaintiff, Role::CounselDefendant];

/// Repeating order for arguments and cross-examination.
const DEBATE_CYCLE: [Role; 3] = [Role::CounselPlaintiff, Role::CounselDefendant, Role::Judge];

/// Order for the verdict: the panel decides, then the judge rules.
const VERDICT_ORDER: [Role; 2] = [Role::Panel, Role::Judge];

/// Returns the role that speaks next, or `None` when the phase has no
/// further defined turn.
///
/// Arguments and cross-examination cycle without bound; the advancement
/// policy ends them.
#[must_use]
pub fn next_role(phase: PhaseKey, phase_message_count: usize) -> Option<Role> {
    match phase {
        PhaseKey::Opening | PhaseKey::Closing => STATEMENT_ORDER.get(phase_message_count).copied(),
        PhaseKey::Arguments | PhaseKey::CrossExamination => {
            Some(DEBATE_CYCLE[phase_message_count % DEBATE_CYCLE.len()])
        }
        PhaseKey::Deliberation => Some(Role::Panel),
        PhaseKey::Verdict => VERDICT_ORDER.get(phase_message_count).copied(),
    }
}

/// Same as [`next_role`] for a phase given by key string.
///
/// Unknown keys yield `None`.
#[must_use]
pub fn next_role_for_key(phase: &str, phase_message_count: usize) -> Option<Role> {
    phase
        .parse::<PhaseKey>()
        .ok()
        .and_then(|p| next_role(p, phase_message_count))
}

/// Resolves the next speaker against the registry.
///
/// A role with no registered participant yields `None`, which the
/// controller treats as phase exhaustion.
#[must_use]
pub fn next_speaker(
    phase: PhaseKey,
    phase_message_count: usize,
    registry: &ParticipantRegistry,
) -> Option<&Participant> {
    next_role(phase, phase_message_count).and_then(|role| registry.by_role(role))
}
