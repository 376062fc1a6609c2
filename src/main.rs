//! `mocktrial` - run mock trials from the command line

use clap::Parser;

use mocktrial::cli::args::Cli;
use mocktrial::cli::commands;
use mocktrial::error::{ExitCode, MockTrialError};
use mocktrial::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.log_format, cli.verbose, cli.quiet, cli.color);

    match commands::dispatch(cli).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e @ (MockTrialError::Interrupted | MockTrialError::Terminated)) => {
            std::process::exit(e.exit_code())
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
