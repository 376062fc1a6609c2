//! The proceeding record: case identity, parties, status, transcript.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ProceedingError;
use crate::intake::CaseAnalysis;
use crate::phase::PhaseKey;

use super::message::{Message, Transcript};
use super::participant::ParticipantRegistry;

/// Title used when a filing does not name its case.
pub const DEFAULT_TITLE: &str = "Custom Dispute";

/// Input needed to open a proceeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFiling {
    /// Optional case title.
    pub title: Option<String>,
    /// Free-form description of the dispute.
    pub description: String,
}

impl CaseFiling {
    /// Creates a filing with no explicit title.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            title: None,
            description: description.into(),
        }
    }

    /// Sets the case title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Checks that the filing can open a proceeding.
    ///
    /// # Errors
    ///
    /// Returns `ProceedingError::MissingDescription` for a blank description.
    pub fn validate(&self) -> Result<(), ProceedingError> {
        if self.description.trim().is_empty() {
            return Err(ProceedingError::MissingDescription);
        }
        Ok(())
    }
}

/// Lifecycle status of a proceeding. Never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProceedingStatus {
    /// Created, participants not yet seated.
    Pending,
    /// In session.
    Active,
    /// The verdict phase has completed.
    Completed,
}

impl fmt::Display for ProceedingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// One full run of the simulated trial.
#[derive(Debug, Clone, Serialize)]
pub struct Proceeding {
    /// Proceeding id.
    pub id: Uuid,
    /// Case title.
    pub title: String,
    /// Subject description as filed.
    pub subject_description: String,
    /// Plaintiff description (from intake).
    pub party_a: String,
    /// Defendant description (from intake).
    pub party_b: String,
    /// Issues identified at intake.
    pub key_issues: Vec<String>,
    /// Legal theory noted at intake.
    pub legal_theory: String,
    /// Current status.
    pub status: ProceedingStatus,
    /// Phase in session, or the last phase once completed.
    pub current_phase: PhaseKey,
    /// Everything said so far.
    pub transcript: Transcript,
    /// When the proceeding was opened.
    pub opened_at: DateTime<Utc>,
}

impl Proceeding {
    /// Opens a pending proceeding from a filing and its intake analysis.
    #[must_use]
    pub fn open(filing: &CaseFiling, analysis: CaseAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: filing
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            subject_description: filing.description.trim().to_string(),
            party_a: analysis.plaintiff,
            party_b: analysis.defendant,
            key_issues: analysis.key_issues,
            legal_theory: analysis.legal_theory,
            status: ProceedingStatus::Pending,
            current_phase: PhaseKey::Opening,
            transcript: Transcript::new(),
            opened_at: Utc::now(),
        }
    }

    /// Moves `pending` to `active`. No effect in any other status.
    pub fn activate(&mut self) {
        if self.status == ProceedingStatus::Pending {
            self.status = ProceedingStatus::Active;
        }
    }

    /// Records that `phase` is now in session. Ignored once completed.
    pub fn enter_phase(&mut self, phase: PhaseKey) {
        if self.status != ProceedingStatus::Completed {
            self.current_phase = phase;
        }
    }

    /// Moves `active` to `completed`. No effect in any other status.
    pub fn conclude(&mut self) {
        if self.status == ProceedingStatus::Active {
            self.status = ProceedingStatus::Completed;
        }
    }

    /// Appends a statement to the transcript.
    ///
    /// # Errors
    ///
    /// See [`Transcript::append`].
    pub fn record(
        &mut self,
        message: Message,
        registry: &ParticipantRegistry,
    ) -> Result<(), ProceedingError> {
        self.transcript.append(message, registry)
    }

    /// Case context handed to the statement generator.
    #[must_use]
    pub fn case_context(&self) -> String {
        let mut context = format!(
            "{}\n\nPlaintiff: {}\nDefendant: {}",
            self.subject_description, self.party_a, self.party_b
        );
        if !self.key_issues.is_empty() {
            context.push_str("\nKey issues: ");
            context.push_str(&self.key_issues.join("; "));
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filing() -> CaseFiling {
        CaseFiling::new("My roommate keeps eating my food")
    }

    #[test]
    fn blank_description_is_rejected() {
        let err = CaseFiling::new("   \n").validate().unwrap_err();
        assert!(matches!(err, ProceedingError::MissingDescription));
        assert!(filing().validate().is_ok());
    }

    #[test]
    fn open_uses_default_title_and_fallback_parties() {
        let p = Proceeding::open(&filing(), CaseAnalysis::fallback());
        assert_eq!(p.title, DEFAULT_TITLE);
        assert_eq!(p.party_a, "Complainant");
        assert_eq!(p.party_b, "Respondent");
        assert_eq!(p.status, ProceedingStatus::Pending);
        assert_eq!(p.current_phase, PhaseKey::Opening);
        assert!(p.transcript.is_empty());
    }

    #[test]
    fn blank_title_falls_back_to_default() {
        let p = Proceeding::open(&filing().with_title("  "), CaseAnalysis::fallback());
        assert_eq!(p.title, DEFAULT_TITLE);
        let p = Proceeding::open(&filing().with_title("Food Theft"), CaseAnalysis::fallback());
        assert_eq!(p.title, "Food Theft");
    }

    #[test]
    fn status_only_moves_forward() {
        let mut p = Proceeding::open(&filing(), CaseAnalysis::fallback());
        p.conclude();
        assert_eq!(p.status, ProceedingStatus::Pending);
        p.activate();
        assert_eq!(p.status, ProceedingStatus::Active);
        p.conclude();
        assert_eq!(p.status, ProceedingStatus::Completed);
        p.activate();
        assert_eq!(p.status, ProceedingStatus::Completed);
    }

    #[test]
    fn case_context_lists_parties_and_issues() {
        let p = Proceeding::open(&filing(), CaseAnalysis::fallback());
        let ctx = p.case_context();
        assert!(ctx.starts_with("My roommate keeps eating my food"));
        assert!(ctx.contains("Plaintiff: Complainant"));
        assert!(ctx.contains("Key issues: Disputed facts; Conflicting accounts"));
    }

    #[test]
    fn current_phase_freezes_at_completion() {
        let mut p = Proceeding::open(&filing(), CaseAnalysis::fallback());
        p.activate();
        p.enter_phase(PhaseKey::Deliberation);
        assert_eq!(p.current_phase, PhaseKey::Deliberation);
        p.enter_phase(PhaseKey::Verdict);
        p.conclude();
        p.enter_phase(PhaseKey::Opening);
        assert_eq!(p.current_phase, PhaseKey::Verdict);
    }
}
