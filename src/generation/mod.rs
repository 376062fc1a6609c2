//! Statement generation
//!
//! The controller asks a [`StatementGenerator`] for each turn's text. The
//! contract is a single request/response exchange; failures are reported
//! as [`GenerationError`] and absorbed by the controller.

pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use serde::Serialize;

use crate::court::{Message, Participant, ParticipantRegistry, Role};
use crate::error::GenerationError;

pub use openai::{ChatClient, OpenAiGenerator};

/// Number of prior messages included in each request.
pub const EXCERPT_LEN: usize = 5;

/// One line of prior conversation, as shown to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcerptLine {
    /// Display name of the speaker.
    pub speaker_name: String,
    /// What they said.
    pub content: String,
}

/// Everything the generator needs to produce one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Display name of the speaker.
    pub speaker_name: String,
    /// Role of the speaker.
    pub role: Role,
    /// Role title ("presiding judge").
    pub role_description: String,
    /// Speaker personality.
    pub personality: String,
    /// Case description, parties, and issues.
    pub case_context: String,
    /// Last few messages, oldest first.
    pub prior_transcript_excerpt: Vec<ExcerptLine>,
    /// Label of the current phase.
    pub phase_label: String,
}

impl GenerationRequest {
    /// Builds a request for `speaker` from the tail of the transcript.
    #[must_use]
    pub fn for_turn(
        speaker: &Participant,
        case_context: String,
        recent: &[Message],
        registry: &ParticipantRegistry,
        phase_label: &str,
    ) -> Self {
        let start = recent.len().saturating_sub(EXCERPT_LEN);
        let prior_transcript_excerpt = recent[start..]
            .iter()
            .map(|m| ExcerptLine {
                speaker_name: registry
                    .get(&m.speaker_id)
                    .map_or_else(|| "Unknown".to_string(), |p| p.name.clone()),
                content: m.content.clone(),
            })
            .collect();

        Self {
            speaker_name: speaker.name.clone(),
            role: speaker.role,
            role_description: speaker.role.profile().title.to_string(),
            personality: speaker.personality.clone(),
            case_context,
            prior_transcript_excerpt,
            phase_label: phase_label.to_string(),
        }
    }
}

/// Generated statement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Free-form statement text.
    pub text: String,
}

/// Produces statement text for a turn.
#[async_trait]
pub trait StatementGenerator: Send + Sync {
    /// Generates one statement.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] when no usable text could be produced.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;
}

/// Generator used when no backend is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl StatementGenerator for UnconfiguredGenerator {
    async fn generate(
        &self,
        _request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}
