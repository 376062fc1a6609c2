//! Error types for `MockTrial`
//!
//! This module provides the error hierarchy for the engine and CLI, along
//! with the process exit codes each error maps to.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `MockTrial` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Proceeding error (invalid transition, missing case description)
    pub const PROCEEDING_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `MockTrial` operations.
///
/// Aggregates all domain-specific errors and maps each one to an exit code.
#[derive(Debug, Error)]
pub enum MockTrialError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Proceeding state machine error
    #[error(transparent)]
    Proceeding(#[from] ProceedingError),

    /// Invalid command-line usage that clap could not catch
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The run was interrupted by the operator
    #[error("interrupted")]
    Interrupted,

    /// The run was stopped by SIGTERM
    #[error("terminated")]
    Terminated,
}

impl MockTrialError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Proceeding(_) => ExitCode::PROCEEDING_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Interrupted => ExitCode::INTERRUPTED,
            Self::Terminated => ExitCode::TERMINATED,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "cast[2].role")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Proceeding Errors
// ============================================================================

/// Errors raised by the proceeding controller.
///
/// Only caller mistakes surface here. Collaborator failures never abort a
/// running proceeding; they are absorbed by placeholder substitution.
#[derive(Debug, Error)]
pub enum ProceedingError {
    /// A proceeding cannot be opened without a subject description
    #[error("a case description is required to start a proceeding")]
    MissingDescription,

    /// The requested operation is not valid in the controller's current state
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        /// Operation that was attempted (e.g., "pause")
        operation: &'static str,
        /// Controller state at the time of the attempt
        state: String,
    },

    /// A message named a speaker outside the participant registry
    #[error("speaker '{0}' is not a participant in this proceeding")]
    UnknownSpeaker(String),

    /// A message id was appended twice
    #[error("message {0} is already in the transcript")]
    DuplicateMessage(uuid::Uuid),
}

// ============================================================================
// Collaborator Errors
// ============================================================================

/// Failures reported by a statement generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No generation backend is configured (missing API key)
    #[error("statement generation is not configured")]
    NotConfigured,

    /// Network-level failure talking to the backend
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// The request exceeded its deadline
    #[error("generation timed out after {0}ms")]
    Timeout(u64),

    /// The backend answered without usable text
    #[error("backend returned no content")]
    EmptyResponse,

    /// The backend answered with a body we could not decode
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Failures reported while analyzing a case description.
///
/// Never escapes the intake layer: every variant resolves to the fallback
/// analysis.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The generation backend failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The analysis text did not contain a JSON object
    #[error("no JSON object in analysis response")]
    MissingJson,

    /// The JSON object did not match the expected shape
    #[error("malformed analysis: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `MockTrial` operations.
pub type Result<T> = std::result::Result<T, MockTrialError>;

// ============================================================================
// Tests
// ============================================================================
