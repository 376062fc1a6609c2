//! Configuration validation
//!
//! Semantic checks run on a deserialized [`TrialConfig`]. Validation collects
//! every issue instead of stopping at the first one.

use std::collections::HashSet;

use crate::config::schema::{TrialConfig, parse_duration_field};
use crate::court::Role;
use crate::error::{Severity, ValidationIssue};

/// Accepted sampling temperature range.
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &TrialConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_pacing(config);
        self.validate_generation(config);
        self.validate_intake(config);
        self.validate_cast(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_pacing(&mut self, config: &TrialConfig) {
        for (name, value) in config.pacing.fields() {
            let path = format!("pacing.{name}");
            if let Err(e) = parse_duration_field(&path, value) {
                self.add_error(&path, &e.to_string());
            }
        }
    }

    fn validate_generation(&mut self, config: &TrialConfig) {
        let generation = &config.generation;

        if generation.model.trim().is_empty() {
            self.add_error("generation.model", "Model name cannot be empty");
        }
        if generation.base_url.trim().is_empty() {
            self.add_error("generation.base_url", "Endpoint URL cannot be empty");
        }
        if generation.api_key_env.trim().is_empty() {
            self.add_error(
                "generation.api_key_env",
                "API key environment variable name cannot be empty",
            );
        }
        self.check_temperature("generation.temperature", generation.temperature);
        if generation.max_tokens == 0 {
            self.add_error("generation.max_tokens", "max_tokens must be greater than 0");
        }
        if let Err(e) = generation.timeout_duration() {
            self.add_error("generation.timeout", &e.to_string());
        }
    }

    fn validate_intake(&mut self, config: &TrialConfig) {
        self.check_temperature("intake.temperature", config.intake.temperature);
    }

    fn validate_cast(&mut self, config: &TrialConfig) {
        if config.cast.is_empty() {
            return;
        }

        let mut seen: HashSet<Role> = HashSet::new();
        for (i, spec) in config.cast.iter().enumerate() {
            if !seen.insert(spec.role) {
                self.add_error(
                    &format!("cast[{i}].role"),
                    &format!("Role '{}' is cast more than once", spec.role),
                );
            }
            if spec.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
                self.add_error(&format!("cast[{i}].name"), "Participant name cannot be empty");
            }
        }

        for role in Role::ALL {
            if !seen.contains(&role) {
                let message = if role == Role::Panel {
                    "No panel is cast; deliberation and verdict will have no speaker".to_string()
                } else {
                    format!("Role '{role}' is not cast; its turns will be skipped")
                };
                self.add_warning("cast", &message);
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn check_temperature(&mut self, path: &str, value: f32) {
        if !TEMPERATURE_RANGE.contains(&value) {
            self.add_error(
                path,
                &format!("Temperature {value} is outside the range 0.0 to 2.0"),
            );
        }
    }

    /// Adds an error to the collection.
    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    /// Adds a warning to the collection.
    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
