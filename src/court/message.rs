//! Messages, message kinds, and the append-only transcript.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProceedingError;
use crate::phase::PhaseKey;

use super::participant::ParticipantRegistry;
use super::role::Role;

/// Functional category of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Argument or statement of position.
    Argument,
    /// Question put during cross-examination.
    Question,
    /// Decision delivered by the panel.
    Verdict,
    /// Ruling delivered by the judge.
    Ruling,
}

impl MessageKind {
    /// Derives the kind of a statement made by `role` during `phase`.
    #[must_use]
    pub const fn for_turn(phase: PhaseKey, role: Role) -> Self {
        match (phase, role) {
            (PhaseKey::Verdict, Role::Panel) => Self::Verdict,
            (PhaseKey::Verdict, _) => Self::Ruling,
            (PhaseKey::CrossExamination, _) => Self::Question,
            _ => Self::Argument,
        }
    }

    /// Snake-case key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Argument => "argument",
            Self::Question => "question",
            Self::Verdict => "verdict",
            Self::Ruling => "ruling",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Unique message id.
    pub id: Uuid,
    /// Id of the participant who spoke.
    pub speaker_id: String,
    /// Statement text as produced by the generator (or its placeholder).
    pub content: String,
    /// Kind derived from phase and role at creation time.
    pub kind: MessageKind,
    /// Phase during which the statement was made.
    pub phase: PhaseKey,
    /// Whether `content` is a placeholder substituted for a failed generation.
    pub placeholder: bool,
    /// Creation timestamp.
    pub produced_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(
        speaker_id: impl Into<String>,
        role: Role,
        phase: PhaseKey,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker_id: speaker_id.into(),
            content: content.into(),
            kind: MessageKind::for_turn(phase, role),
            phase,
            placeholder: false,
            produced_at: Utc::now(),
        }
    }

    /// Marks the content as a substituted placeholder.
    #[must_use]
    pub const fn into_placeholder(mut self) -> Self {
        self.placeholder = true;
        self
    }
}

/// Ordered, append-only sequence of messages.
///
/// Insertion order is speaking order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Appends a message after checking it against the registry.
    ///
    /// # Errors
    ///
    /// Returns `ProceedingError::UnknownSpeaker` if the speaker is not
    /// registered, or `ProceedingError::DuplicateMessage` if the id is
    /// already present.
    pub fn append(
        &mut self,
        message: Message,
        registry: &ParticipantRegistry,
    ) -> Result<(), ProceedingError> {
        if !registry.contains(&message.speaker_id) {
            return Err(ProceedingError::UnknownSpeaker(message.speaker_id));
        }
        if self.messages.iter().any(|m| m.id == message.id) {
            return Err(ProceedingError::DuplicateMessage(message.id));
        }
        self.messages.push(message);
        Ok(())
    }

    /// All messages in speaking order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The last `n` messages, oldest first.
    #[must_use]
    pub fn tail(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Number of recorded messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing has been said yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mapping_by_phase_and_role() {
        assert_eq!(
            MessageKind::for_turn(PhaseKey::Verdict, Role::Panel),
            MessageKind::Verdict
        );
        assert_eq!(
            MessageKind::for_turn(PhaseKey::Verdict, Role::Judge),
            MessageKind::Ruling
        );
        for role in Role::ALL {
            assert_eq!(
                MessageKind::for_turn(PhaseKey::CrossExamination, role),
                MessageKind::Question
            );
            for phase in [
                PhaseKey::Opening,
                PhaseKey::Arguments,
                PhaseKey::Closing,
                PhaseKey::Deliberation,
            ] {
                assert_eq!(MessageKind::for_turn(phase, role), MessageKind::Argument);
            }
        }
    }

    #[test]
    fn append_rejects_unknown_speaker() {
        let registry = ParticipantRegistry::default_cast("p1");
        let mut transcript = Transcript::new();
        let stray = Message::new("judge-p2", Role::Judge, PhaseKey::Opening, "order");
        let err = transcript.append(stray, &registry).unwrap_err();
        assert!(matches!(err, ProceedingError::UnknownSpeaker(id) if id == "judge-p2"));
        assert!(transcript.is_empty());
    }

    #[test]
    fn append_rejects_duplicate_ids() {
        let registry = ParticipantRegistry::default_cast("p1");
        let mut transcript = Transcript::new();
        let msg = Message::new("judge-p1", Role::Judge, PhaseKey::Opening, "order");
        transcript.append(msg.clone(), &registry).unwrap();
        assert!(matches!(
            transcript.append(msg, &registry),
            Err(ProceedingError::DuplicateMessage(_))
        ));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn tail_preserves_order() {
        let registry = ParticipantRegistry::default_cast("p1");
        let mut transcript = Transcript::new();
        for i in 0..7 {
            let msg = Message::new("judge-p1", Role::Judge, PhaseKey::Opening, format!("m{i}"));
            transcript.append(msg, &registry).unwrap();
        }
        let tail: Vec<&str> = transcript.tail(5).iter().map(|m| m.content.as_str()).collect();
        assert_eq!(tail, ["m2", "m3", "m4", "m5", "m6"]);
        assert_eq!(transcript.tail(50).len(), 7);
    }
}
