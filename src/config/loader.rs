//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check against [`ConfigLimits`]
//! 2. UTF-8 BOM strip
//! 3. Environment variable expansion (pre-parse, on raw text)
//! 4. YAML parsing and empty-file rejection
//! 5. Deserialization to [`TrialConfig`]
//! 6. Validation
//! 7. Freeze with `Arc`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Value;

use crate::config::schema::TrialConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Limits applied while loading configuration.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("MOCKTRIAL_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<TrialConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    limits: ConfigLimits,
}

impl ConfigLoader {
    /// Creates a loader with the given limits.
    #[must_use]
    pub const fn new(limits: ConfigLimits) -> Self {
        Self { limits }
    }

    /// Creates a loader with default limits.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads, validates, and freezes a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - A required environment variable is unset
    /// - YAML parsing fails or the file is empty
    /// - Validation fails
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > self.limits.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {} bytes", self.limits.max_config_size),
            });
        }

        let raw_content = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_str(&raw_content, path)
    }

    /// Runs the pipeline on already-read text. `path` is used for messages.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], minus the file access errors.
    pub fn load_str(&self, raw_content: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let raw_content = raw_content.strip_prefix('\u{feff}').unwrap_or(raw_content);

        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw_content, path)?;
        warnings.extend(env_sub.warnings);

        let root: Value =
            serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        if root.is_null() {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: "Configuration file is empty".to_string(),
            });
        }

        let config: TrialConfig =
            serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: format!("Failed to deserialize configuration: {e}"),
            })?;

        let validation_result = Validator::new().validate(&config);

        if validation_result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: validation_result.errors,
            });
        }

        for issue in validation_result.warnings {
            warnings.push(LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            });
        }

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text before parsing so substituted values keep their
/// YAML type inference.
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw YAML text.
    ///
    /// Supports:
    /// - `${VAR}` - expand to value (empty string if unset, with warning)
    /// - `${VAR:-default}` - expand to default if unset
    /// - `${VAR:?message}` - fail if unset
    /// - `$$` - literal `$`
    fn substitute(&mut self, raw_yaml: &str, source_path: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw_yaml.len());
        let mut chars = raw_yaml.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let spec = VarSpec::parse(&mut chars, source_path)?;
                    match std::env::var(&spec.name) {
                        Ok(value) => result.push_str(&value),
                        Err(_) => match spec.fallback {
                            Fallback::Default(default_val) => result.push_str(&default_val),
                            Fallback::Required(msg) => {
                                return Err(ConfigError::EnvVarNotSet {
                                    var: spec.name,
                                    location: msg,
                                });
                            }
                            Fallback::Empty => self.warnings.push(LoadWarning {
                                message: format!(
                                    "Environment variable '{}' is not set, using empty string",
                                    spec.name
                                ),
                                location: Some(source_path.display().to_string()),
                            }),
                        },
                    }
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }
}

/// What to do when a referenced variable is unset.
enum Fallback {
    Empty,
    Default(String),
    Required(String),
}

/// A parsed `${...}` reference.
struct VarSpec {
    name: String,
    fallback: Fallback,
}

impl VarSpec {
    /// Parses the body of a `${...}` reference; the opening brace has been
    /// consumed.
    fn parse(
        chars: &mut std::iter::Peekable<std::str::Chars>,
        source_path: &Path,
    ) -> Result<Self, ConfigError> {
        let mut name = String::new();

        while let Some(c) = chars.next() {
            match c {
                '}' => {
                    return Ok(Self {
                        name,
                        fallback: Fallback::Empty,
                    });
                }
                ':' if chars.peek() == Some(&'-') => {
                    chars.next();
                    let default = read_until_close(chars, source_path)?;
                    return Ok(Self {
                        name,
                        fallback: Fallback::Default(default),
                    });
                }
                ':' if chars.peek() == Some(&'?') => {
                    chars.next();
                    let msg = read_until_close(chars, source_path)?;
                    return Ok(Self {
                        name,
                        fallback: Fallback::Required(msg),
                    });
                }
                _ => name.push(c),
            }
        }

        Err(unclosed(source_path, &name))
    }
}

/// Reads up to the matching `}`, keeping nested braces.
fn read_until_close(
    chars: &mut std::iter::Peekable<std::str::Chars>,
    source_path: &Path,
) -> Result<String, ConfigError> {
    let mut value = String::new();
    let mut depth = 1;

    for c in chars.by_ref() {
        match c {
            '{' => {
                depth += 1;
                value.push(c);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(value);
                }
                value.push(c);
            }
            _ => value.push(c),
        }
    }

    Err(unclosed(source_path, &value))
}

fn unclosed(source_path: &Path, partial: &str) -> ConfigError {
    ConfigError::ParseError {
        path: PathBuf::from(source_path),
        line: None,
        message: format!("Unclosed environment variable reference: ${{{partial}"),
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(yaml: &str) -> Result<LoadResult, ConfigError> {
        ConfigLoader::with_defaults().load_str(yaml, Path::new("test.yaml"))
    }

    #[test]
    fn test_env_substitution_simple() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute("path: ${PATH}", Path::new("test.yaml"))
            .unwrap();
        assert!(!result.contains("${PATH}"));
        assert!(result.len() > "path: ".len());
    }

    #[test]
    fn test_env_substitution_default() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute(
                "model: ${MOCKTRIAL_TEST_NONEXISTENT_XYZ123:-gpt-4o-mini}",
                Path::new("test.yaml"),
            )
            .unwrap();
        assert_eq!(result, "model: gpt-4o-mini");
    }

    #[test]
    fn test_env_substitution_required_missing() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute(
            "model: ${MOCKTRIAL_TEST_REQUIRED_XYZ123:?model must be set}",
            Path::new("test.yaml"),
        );
        match result {
            Err(ConfigError::EnvVarNotSet { var, location }) => {
                assert_eq!(var, "MOCKTRIAL_TEST_REQUIRED_XYZ123");
                assert_eq!(location, "model must be set");
            }
            other => panic!("Expected EnvVarNotSet error, got {other:?}"),
        }
    }

    #[test]
    fn test_env_substitution_escaped_dollar() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute("name: $$100 Judge", Path::new("test.yaml"))
            .unwrap();
        assert_eq!(result, "name: $100 Judge");
    }

    #[test]
    fn test_env_substitution_missing_warning() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute("name: ${MOCKTRIAL_TEST_WARN_XYZ123}", Path::new("test.yaml"))
            .unwrap();
        assert_eq!(result, "name: ");
        assert_eq!(sub.warnings.len(), 1);
        assert!(sub.warnings[0].message.contains("MOCKTRIAL_TEST_WARN_XYZ123"));
    }

    #[test]
    fn test_unclosed_reference_is_parse_error() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute("name: ${OPEN", Path::new("test.yaml"));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_bom_is_stripped() {
        let result = load("\u{feff}pacing:\n  turn_delay: 2s\n").unwrap();
        assert_eq!(result.config.pacing.turn_delay, "2s");
    }

    #[test]
    fn test_empty_file_is_rejected() {
        match load("   \n# only a comment\n") {
            Err(ConfigError::ParseError { message, .. }) => assert!(message.contains("empty")),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_errors_surface() {
        let result = load("generation:\n  temperature: 5.0\n  max_tokens: 0\n");
        match result {
            Err(ConfigError::ValidationError { errors, .. }) => assert_eq!(errors.len(), 2),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_panel_is_a_warning() {
        let result = load("cast:\n  - role: judge\n").unwrap();
        assert!(result.warnings.iter().any(|w| w.message.contains("panel")));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "intake:\n  enabled: false").unwrap();
        let result = ConfigLoader::with_defaults().load(file.path()).unwrap();
        assert!(!result.config.intake.enabled);
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::with_defaults().load(Path::new("/nonexistent/mocktrial.yaml"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_size_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pacing:\n  turn_delay: 2s").unwrap();
        let loader = ConfigLoader::new(ConfigLimits { max_config_size: 4 });
        match loader.load(file.path()) {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "file_size"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_config_limits_default() {
        assert!(ConfigLimits::default().max_config_size > 0);
    }
}
