//! `config` command handlers
//!
//! Implements `config validate`.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{ConfigValidateArgs, OutputFormat};
use crate::config::{ConfigLoader, LoadWarning};
use crate::error::{ConfigError, MockTrialError, Severity, ValidationIssue};

/// Outcome for one validated file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Validate configuration files.
///
/// Every file is checked and reported before the first failure is
/// returned.
///
/// # Errors
///
/// Returns an I/O error if a file does not exist, or a config error for
/// the first file that failed validation.
pub fn validate(args: &ConfigValidateArgs) -> Result<(), MockTrialError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_failure: Option<MockTrialError> = None;

    for path in &args.files {
        if !path.exists() {
            return Err(MockTrialError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }
        tracing::info!(file = %path.display(), "validating configuration");

        let (report, failure) = check_file(&loader, path, args.strict);
        if failure.is_some() && first_failure.is_none() {
            first_failure = failure;
        }
        reports.push(report);
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                let mark = if report.valid { "ok" } else { "FAILED" };
                println!("{}: {mark}", report.file);
                for e in &report.errors {
                    println!("  {e}");
                }
                for w in &report.warnings {
                    println!("  {w}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    first_failure.map_or(Ok(()), Err)
}

fn check_file(
    loader: &ConfigLoader,
    path: &Path,
    strict: bool,
) -> (FileReport, Option<MockTrialError>) {
    let file = path.display().to_string();

    match loader.load(path) {
        Ok(result) => {
            let warnings: Vec<String> = result.warnings.iter().map(describe_warning).collect();
            if strict && !result.warnings.is_empty() {
                let issues = result.warnings.into_iter().map(strict_issue).collect();
                let report = FileReport {
                    file: file.clone(),
                    valid: false,
                    errors: Vec::new(),
                    warnings,
                };
                let err = ConfigError::ValidationError {
                    path: file,
                    errors: issues,
                };
                return (report, Some(err.into()));
            }
            tracing::info!(file = %file, "configuration valid");
            (
                FileReport {
                    file,
                    valid: true,
                    errors: Vec::new(),
                    warnings,
                },
                None,
            )
        }
        Err(err) => {
            let errors = match &err {
                ConfigError::ValidationError { errors, .. } => {
                    errors.iter().map(ToString::to_string).collect()
                }
                other => vec![other.to_string()],
            };
            (
                FileReport {
                    file,
                    valid: false,
                    errors,
                    warnings: Vec::new(),
                },
                Some(err.into()),
            )
        }
    }
}

fn describe_warning(warning: &LoadWarning) -> String {
    match &warning.location {
        Some(location) => format!("warning: {} at {location}", warning.message),
        None => format!("warning: {}", warning.message),
    }
}

fn strict_issue(warning: LoadWarning) -> ValidationIssue {
    ValidationIssue {
        path: warning.location.unwrap_or_else(|| "<unknown>".to_string()),
        message: warning.message,
        severity: Severity::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn valid_file_reports_ok() {
        let file = write_config("pacing:\n  turn_delay: 2s\n");
        let (report, failure) = check_file(&ConfigLoader::with_defaults(), file.path(), false);
        assert!(report.valid);
        assert!(failure.is_none());
    }

    #[test]
    fn strict_mode_fails_on_warnings() {
        let file = write_config("cast:\n  - role: judge\n");
        let loader = ConfigLoader::with_defaults();

        let (report, failure) = check_file(&loader, file.path(), false);
        assert!(report.valid);
        assert!(!report.warnings.is_empty());
        assert!(failure.is_none());

        let (report, failure) = check_file(&loader, file.path(), true);
        assert!(!report.valid);
        assert!(matches!(
            failure,
            Some(MockTrialError::Config(ConfigError::ValidationError { .. }))
        ));
    }

    #[test]
    fn invalid_file_lists_every_issue() {
        let file = write_config(
            "generation:\n  temperature: 5.0\n  max_tokens: 0\ncast:\n  - role: judge\n  - role: judge\n",
        );
        let (report, failure) = check_file(&ConfigLoader::with_defaults(), file.path(), false);
        assert!(!report.valid);
        assert!(report.errors.len() >= 3, "errors: {:?}", report.errors);
        assert_eq!(failure.map(|e| e.exit_code()), Some(2));
    }
}
