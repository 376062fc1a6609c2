//! Configuration schema types
//!
//! These types are deserialized from YAML configuration files. Every section
//! is optional; an absent section takes its defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::Pacing;
use crate::court::ParticipantSpec;
use crate::error::ConfigError;

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration for `MockTrial`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct TrialConfig {
    /// Delays between automatic steps
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Statement generation backend
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Case intake analysis
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Cast overrides; empty means the default four-member cast
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cast: Vec<ParticipantSpec>,
}

// ============================================================================
// Pacing
// ============================================================================

/// Delay settings as written in configuration (humantime strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct PacingConfig {
    /// Delay between start and the first turn
    #[serde(default = "default_initial_delay")]
    pub initial_delay: String,

    /// Delay after a statement when the phase continues
    #[serde(default = "default_turn_delay")]
    pub turn_delay: String,

    /// Delay after a phase advances
    #[serde(default = "default_phase_delay")]
    pub phase_delay: String,

    /// Delay after resuming
    #[serde(default = "default_resume_delay")]
    pub resume_delay: String,
}

fn default_initial_delay() -> String {
    "1s".to_string()
}

fn default_turn_delay() -> String {
    "1500ms".to_string()
}

fn default_phase_delay() -> String {
    "1s".to_string()
}

fn default_resume_delay() -> String {
    "500ms".to_string()
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            initial_delay: default_initial_delay(),
            turn_delay: default_turn_delay(),
            phase_delay: default_phase_delay(),
            resume_delay: default_resume_delay(),
        }
    }
}

impl PacingConfig {
    /// Named delay fields, for validation and resolution.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("initial_delay", &self.initial_delay),
            ("turn_delay", &self.turn_delay),
            ("phase_delay", &self.phase_delay),
            ("resume_delay", &self.resume_delay),
        ]
    }

    /// Parses every delay into a [`Pacing`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first field that is
    /// not a valid duration.
    pub fn resolve(&self) -> Result<Pacing, ConfigError> {
        Ok(Pacing {
            initial_delay: parse_duration_field("pacing.initial_delay", &self.initial_delay)?,
            turn_delay: parse_duration_field("pacing.turn_delay", &self.turn_delay)?,
            phase_delay: parse_duration_field("pacing.phase_delay", &self.phase_delay)?,
            resume_delay: parse_duration_field("pacing.resume_delay", &self.resume_delay)?,
        })
    }
}

/// Parses a humantime duration string, naming `field` on failure.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if `value` does not parse.
pub fn parse_duration_field(field: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: "a duration such as \"1500ms\" or \"2s\"".to_string(),
    })
}

// ============================================================================
// Generation
// ============================================================================

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default chat completions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default environment variable holding the API key.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Statement generation backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct GenerationConfig {
    /// Chat model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Chat completions endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable read for the bearer key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature for statements
    #[serde(default = "default_generation_temperature")]
    pub temperature: f32,

    /// Upper bound on statement length in tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request deadline
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

const fn default_generation_temperature() -> f32 {
    0.7
}

const fn default_max_tokens() -> u32 {
    300
}

fn default_timeout() -> String {
    "30s".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            temperature: default_generation_temperature(),
            max_tokens: default_max_tokens(),
            timeout: default_timeout(),
        }
    }
}

impl GenerationConfig {
    /// Reads the API key from the configured environment variable.
    ///
    /// Returns `None` when the variable is unset or blank.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    /// Parsed request deadline.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `timeout` does not parse.
    pub fn timeout_duration(&self) -> Result<Duration, ConfigError> {
        parse_duration_field("generation.timeout", &self.timeout)
    }
}

// ============================================================================
// Intake
// ============================================================================

/// Case intake analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct IntakeConfig {
    /// Whether to ask the backend to analyze the case
    #[serde(default = "default_intake_enabled")]
    pub enabled: bool,

    /// Sampling temperature for analysis
    #[serde(default = "default_intake_temperature")]
    pub temperature: f32,
}

const fn default_intake_enabled() -> bool {
    true
}

const fn default_intake_temperature() -> f32 {
    0.3
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            enabled: default_intake_enabled(),
            temperature: default_intake_temperature(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::court::Role;

    #[test]
    fn test_empty_mapping_uses_defaults() {
        let config: TrialConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.pacing, PacingConfig::default());
        assert_eq!(config.generation.model, "gpt-4o");
        assert_eq!(config.generation.max_tokens, 300);
        assert!((config.intake.temperature - 0.3).abs() < f32::EPSILON);
        assert!(config.cast.is_empty());
    }

    #[test]
    fn test_pacing_defaults_resolve() {
        let pacing = PacingConfig::default().resolve().unwrap();
        assert_eq!(pacing.initial_delay, Duration::from_secs(1));
        assert_eq!(pacing.turn_delay, Duration::from_millis(1500));
        assert_eq!(pacing.phase_delay, Duration::from_secs(1));
        assert_eq!(pacing.resume_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_zero_delays_are_allowed() {
        let yaml = "pacing:\n  initial_delay: 0s\n  turn_delay: 0s\n  phase_delay: 0s\n  resume_delay: 0s\n";
        let config: TrialConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.pacing.resolve().unwrap(), Pacing::immediate());
    }

    #[test]
    fn test_invalid_delay_names_field() {
        let pacing = PacingConfig {
            turn_delay: "soon".to_string(),
            ..PacingConfig::default()
        };
        match pacing.resolve() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "pacing.turn_delay"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_cast_accepts_legacy_role_names() {
        let yaml = "cast:\n  - role: judge\n    name: Judge Okafor\n  - role: jury\n";
        let config: TrialConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cast.len(), 2);
        assert_eq!(config.cast[0].name.as_deref(), Some("Judge Okafor"));
        assert_eq!(config.cast[1].role, Role::Panel);
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(serde_yaml::from_str::<TrialConfig>("courtroom: {}").is_err());
    }

    #[test]
    fn test_generation_timeout_parses() {
        let config = GenerationConfig::default();
        assert_eq!(config.timeout_duration().unwrap(), Duration::from_secs(30));
    }
}
