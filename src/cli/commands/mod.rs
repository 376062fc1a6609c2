//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod config;
pub mod run;
pub mod samples;
pub mod version;

use crate::cli::args::{Cli, Commands, ConfigSubcommand};
use crate::error::MockTrialError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), MockTrialError> {
    match cli.command {
        Commands::Run(args) => run::run(&args).await,
        Commands::Samples(args) => samples::run(&args),
        Commands::Config(cmd) => match cmd.subcommand {
            ConfigSubcommand::Validate(args) => config::validate(&args),
        },
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}
