//! Case intake
//!
//! Turns a free-form dispute description into party labels, key issues,
//! and a legal theory. Analysis never fails at the trait boundary: any
//! backend or parse failure resolves to [`CaseAnalysis::fallback`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::IntakeError;
use crate::generation::ChatClient;

const ANALYST_PROMPT: &str = r#"You are a legal analyst. Analyze the following dispute and extract key information in JSON format:
{
  "plaintiff": "brief description of the person bringing the complaint",
  "defendant": "brief description of the person being accused",
  "keyIssues": ["issue1", "issue2", "issue3"],
  "legalTheory": "brief explanation of the legal principles at stake"
}"#;

/// Structured result of case intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysis {
    /// Who brings the complaint.
    pub plaintiff: String,
    /// Who is accused.
    pub defendant: String,
    /// Issues in dispute.
    #[serde(default)]
    pub key_issues: Vec<String>,
    /// Legal principles at stake.
    #[serde(default)]
    pub legal_theory: String,
}

impl CaseAnalysis {
    /// Generic analysis used whenever real analysis is unavailable.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            plaintiff: "Complainant".to_string(),
            defendant: "Respondent".to_string(),
            key_issues: vec![
                "Disputed facts".to_string(),
                "Conflicting accounts".to_string(),
                "Resolution needed".to_string(),
            ],
            legal_theory: "General dispute resolution principles apply".to_string(),
        }
    }

    /// Extracts an analysis from backend text.
    ///
    /// The text may wrap the object in prose or a code fence; the span from
    /// the first `{` to the last `}` is parsed.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::MissingJson` if no object span exists, or
    /// `IntakeError::Malformed` if it does not decode.
    pub fn from_response_text(text: &str) -> Result<Self, IntakeError> {
        let start = text.find('{').ok_or(IntakeError::MissingJson)?;
        let end = text.rfind('}').ok_or(IntakeError::MissingJson)?;
        if end < start {
            return Err(IntakeError::MissingJson);
        }
        let analysis: Self = serde_json::from_str(&text[start..=end])?;
        Ok(analysis.filled_from_fallback())
    }

    /// Replaces blank fields with their fallback values.
    fn filled_from_fallback(mut self) -> Self {
        let fallback = Self::fallback();
        if self.plaintiff.trim().is_empty() {
            self.plaintiff = fallback.plaintiff;
        }
        if self.defendant.trim().is_empty() {
            self.defendant = fallback.defendant;
        }
        if self.key_issues.is_empty() {
            self.key_issues = fallback.key_issues;
        }
        if self.legal_theory.trim().is_empty() {
            self.legal_theory = fallback.legal_theory;
        }
        self
    }
}

/// Analyzes a case description.
#[async_trait]
pub trait CaseAnalyzer: Send + Sync {
    /// Returns the analysis, or the fallback on any failure.
    async fn analyze(&self, description: &str) -> CaseAnalysis;
}

/// Analyzer that always returns [`CaseAnalysis::fallback`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackAnalyzer;

#[async_trait]
impl CaseAnalyzer for FallbackAnalyzer {
    async fn analyze(&self, _description: &str) -> CaseAnalysis {
        CaseAnalysis::fallback()
    }
}

/// Analyzer backed by a chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCaseAnalyzer {
    client: ChatClient,
    temperature: f32,
}

impl OpenAiCaseAnalyzer {
    /// Creates an analyzer over `client`.
    #[must_use]
    pub const fn new(client: ChatClient, temperature: f32) -> Self {
        Self {
            client,
            temperature,
        }
    }

    async fn try_analyze(&self, description: &str) -> Result<CaseAnalysis, IntakeError> {
        let text = self
            .client
            .complete(ANALYST_PROMPT, description, self.temperature, None)
            .await?;
        CaseAnalysis::from_response_text(&text)
    }
}

#[async_trait]
impl CaseAnalyzer for OpenAiCaseAnalyzer {
    async fn analyze(&self, description: &str) -> CaseAnalysis {
        match self.try_analyze(description).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "case analysis failed; using generic parties");
                CaseAnalysis::fallback()
            }
        }
    }
}
