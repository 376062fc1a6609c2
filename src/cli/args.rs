//! CLI argument definitions
//!
//! All Clap derive structs for `mocktrial` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::{ColorChoice, LogFormat};
use crate::samples::SampleCategory;

// ============================================================================
// Root CLI
// ============================================================================

/// Mock trial orchestration engine.
#[derive(Parser, Debug)]
#[command(name = "mocktrial", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "MOCKTRIAL_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "MOCKTRIAL_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a proceeding to completion.
    Run(RunArgs),

    /// List the built-in sample cases.
    Samples(SamplesArgs),

    /// Work with configuration files.
    Config(ConfigCommand),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Run Command
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("case_source").required(true).multiple(false))]
pub struct RunArgs {
    /// Case description text.
    #[arg(long = "case", group = "case_source", value_name = "TEXT")]
    pub case_text: Option<String>,

    /// Read the case description from a file.
    #[arg(long, group = "case_source", value_name = "PATH")]
    pub case_file: Option<PathBuf>,

    /// Use a built-in sample case.
    #[arg(long, group = "case_source", value_name = "ID")]
    pub sample: Option<String>,

    /// Case title (defaults to the sample title or "Custom Dispute").
    #[arg(long)]
    pub title: Option<String>,

    /// Path to YAML configuration file.
    #[arg(short, long, env = "MOCKTRIAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip every pacing delay.
    #[arg(long)]
    pub fast: bool,

    /// Read control commands from stdin while running.
    #[arg(short, long)]
    pub interactive: bool,

    /// Write the exported transcript to this path when done.
    #[arg(long, value_name = "PATH")]
    pub transcript_out: Option<PathBuf>,

    /// Write JSONL events to this path instead of discarding them.
    #[arg(long, value_name = "PATH", env = "MOCKTRIAL_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this port.
    #[arg(long, env = "MOCKTRIAL_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Output format for statements.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Samples / Config / Version
// ============================================================================

/// Arguments for `samples`.
#[derive(Args, Debug)]
pub struct SamplesArgs {
    /// Only list this category.
    #[arg(long)]
    pub category: Option<SampleCategory>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Configuration commands.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Config subcommand.
    #[command(subcommand)]
    pub subcommand: ConfigSubcommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Validate configuration files.
    Validate(ConfigValidateArgs),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
pub struct ConfigValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================
