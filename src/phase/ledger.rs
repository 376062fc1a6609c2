//! Phase keys and the ordered phase ledger.
//!
//! The ledger holds the six phases of a proceeding in their fixed order,
//! tracks which one is current, and records where in the transcript the
//! current phase began so that counts are scoped to the phase window.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::court::{Message, MessageKind};

/// Named stage of a proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKey {
    /// Opening statements.
    Opening,
    /// Primary arguments.
    Arguments,
    /// Cross-examination.
    CrossExamination,
    /// Closing arguments.
    Closing,
    /// Jury deliberation.
    Deliberation,
    /// Final verdict. Terminal.
    Verdict,
}

impl PhaseKey {
    /// All phases in proceeding order.
    pub const ORDER: [Self; 6] = [
        Self::Opening,
        Self::Arguments,
        Self::CrossExamination,
        Self::Closing,
        Self::Deliberation,
        Self::Verdict,
    ];

    /// Snake-case key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Arguments => "arguments",
            Self::CrossExamination => "cross_examination",
            Self::Closing => "closing",
            Self::Deliberation => "deliberation",
            Self::Verdict => "verdict",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Opening => "Opening Statements",
            Self::Arguments => "Primary Arguments",
            Self::CrossExamination => "Cross-Examination",
            Self::Closing => "Closing Arguments",
            Self::Deliberation => "Jury Deliberation",
            Self::Verdict => "Final Verdict",
        }
    }

    /// Zero-based position in [`PhaseKey::ORDER`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The phase that follows this one, or `None` for the verdict.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Opening => Some(Self::Arguments),
            Self::Arguments => Some(Self::CrossExamination),
            Self::CrossExamination => Some(Self::Closing),
            Self::Closing => Some(Self::Deliberation),
            Self::Deliberation => Some(Self::Verdict),
            Self::Verdict => None,
        }
    }

    /// Returns `true` for the terminal phase.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verdict)
    }

    /// Whether a message of `kind` counts toward this phase's turn count.
    ///
    /// The verdict phase counts both the panel's verdict and the judge's
    /// ruling; every other phase counts its single dominant kind.
    #[must_use]
    pub const fn counts_kind(self, kind: MessageKind) -> bool {
        match self {
            Self::Verdict => matches!(kind, MessageKind::Verdict | MessageKind::Ruling),
            Self::CrossExamination => matches!(kind, MessageKind::Question),
            _ => matches!(kind, MessageKind::Argument),
        }
    }
}

impl fmt::Display for PhaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ORDER
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown phase '{s}'"))
    }
}

/// A ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phase {
    /// Phase key.
    pub key: PhaseKey,
    /// Human-readable label.
    pub label: &'static str,
    /// Set once, when the phase is advanced past. Never reset.
    pub completed: bool,
    /// When the phase became current.
    pub entered_at: Option<DateTime<Utc>>,
}

/// Outcome of advancing the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAdvance {
    /// `from` completed and `to` is now current.
    Entered {
        /// Phase that was completed.
        from: PhaseKey,
        /// Phase that is now current.
        to: PhaseKey,
    },
    /// The terminal phase completed; the proceeding is over.
    Concluded,
    /// Every phase was already complete.
    AlreadyConcluded,
}

/// Ordered phase ledger for one proceeding.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseLedger {
    phases: Vec<Phase>,
    current: usize,
    /// Transcript length at the moment the current phase was entered.
    current_started_at: usize,
}

impl Default for PhaseLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseLedger {
    /// Creates a ledger positioned at the opening phase.
    #[must_use]
    pub fn new() -> Self {
        let mut phases: Vec<Phase> = PhaseKey::ORDER
            .into_iter()
            .map(|key| Phase {
                key,
                label: key.label(),
                completed: false,
                entered_at: None,
            })
            .collect();
        phases[0].entered_at = Some(Utc::now());
        Self {
            phases,
            current: 0,
            current_started_at: 0,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn current(&self) -> &Phase {
        &self.phases[self.current]
    }

    /// Current phase key.
    #[must_use]
    pub fn current_key(&self) -> PhaseKey {
        self.current().key
    }

    /// Key of the phase after the current one.
    #[must_use]
    pub fn next_key(&self) -> Option<PhaseKey> {
        self.current_key().next()
    }

    /// All phases in order.
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Returns `true` once the terminal phase has been completed.
    #[must_use]
    pub fn is_concluded(&self) -> bool {
        self.current_key().is_terminal() && self.current().completed
    }

    /// Transcript index at which the current phase began.
    #[must_use]
    pub const fn current_started_at(&self) -> usize {
        self.current_started_at
    }

    /// Counts statements made in the current phase window that count toward
    /// its turn order.
    #[must_use]
    pub fn phase_message_count(&self, messages: &[Message]) -> usize {
        let key = self.current_key();
        messages
            .get(self.current_started_at..)
            .unwrap_or_default()
            .iter()
            .filter(|m| key.counts_kind(m.kind))
            .count()
    }

    /// Completes the current phase and moves to the next one.
    ///
    /// `transcript_len` marks where the new phase's window begins.
    pub fn advance(&mut self, transcript_len: usize) -> LedgerAdvance {
        if self.is_concluded() {
            return LedgerAdvance::AlreadyConcluded;
        }

        let from = self.current_key();
        self.phases[self.current].completed = true;

        let Some(to) = self.next_key() else {
            return LedgerAdvance::Concluded;
        };

        self.current += 1;
        self.current_started_at = transcript_len;
        self.phases[self.current].entered_at = Some(Utc::now());

        LedgerAdvance::Entered { from, to }
    }
}
