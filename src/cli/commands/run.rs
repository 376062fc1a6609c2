//! `run` command handler
//!
//! Opens a proceeding, prints statements as they are recorded, and waits
//! until the verdict. With `--interactive`, stdin lines control the
//! proceeding:
//!
//! | input | action |
//! |---|---|
//! | `p` | pause |
//! | `r` | resume |
//! | `n` | advance to the next phase |
//! | `x` | reset (abort) |
//! | `e` | print the transcript export |

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cli::args::{OutputFormat, RunArgs};
use crate::config::{ConfigLoader, TrialConfig};
use crate::controller::{
    ControllerOptions, ControllerState, FeedEvent, Pacing, ProceedingController,
};
use crate::court::CaseFiling;
use crate::error::MockTrialError;
use crate::export;
use crate::generation::{ChatClient, OpenAiGenerator, StatementGenerator, UnconfiguredGenerator};
use crate::intake::{CaseAnalyzer, FallbackAnalyzer, OpenAiCaseAnalyzer};
use crate::observability::EventEmitter;
use crate::samples::{find_sample, suggest_sample};

/// Run a proceeding to completion.
///
/// # Errors
///
/// Returns a usage error for an unknown sample, an I/O error if the case
/// file or an output file cannot be accessed, a config error if the
/// configuration fails to load, `MockTrialError::Interrupted` on Ctrl-C, or
/// `MockTrialError::Terminated` on SIGTERM.
pub async fn run(args: &RunArgs) -> Result<(), MockTrialError> {
    let filing = resolve_filing(args)?;
    let config = load_config(args.config.as_ref())?;

    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let emitter = match args.events_file {
        Some(ref path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let pacing = if args.fast {
        Pacing::immediate()
    } else {
        config.pacing.resolve()?
    };

    let (generator, analyzer) = build_collaborators(&config)?;
    let controller = ProceedingController::new(
        generator,
        analyzer,
        ControllerOptions {
            pacing,
            cast: config.cast.clone(),
            emitter: Arc::new(emitter),
            ..ControllerOptions::default()
        },
    );

    let mut sigterm = signal(SignalKind::terminate())?;
    let feed = controller.subscribe();
    let id = controller.start(filing).await?;
    info!(proceeding_id = %id, "proceeding running");

    if args.format == OutputFormat::Human {
        print_header(&controller);
    }
    let printer = spawn_printer(feed, args.format);
    let control = args
        .interactive
        .then(|| spawn_control(controller.clone(), args.format));

    let settled = tokio::select! {
        state = controller.wait_until_settled() => state,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; resetting proceeding");
            return Err(abandon(&controller, printer, control, MockTrialError::Interrupted));
        }
        _ = sigterm.recv() => {
            warn!("terminated; resetting proceeding");
            return Err(abandon(&controller, printer, control, MockTrialError::Terminated));
        }
    };

    let _ = printer.await;
    if let Some(handle) = control {
        handle.abort();
    }

    finish(&controller, settled, args)
}

/// Resets the proceeding and stops the output tasks.
fn abandon(
    controller: &ProceedingController,
    printer: JoinHandle<()>,
    control: Option<JoinHandle<()>>,
    reason: MockTrialError,
) -> MockTrialError {
    controller.reset();
    if let Some(handle) = control {
        handle.abort();
    }
    printer.abort();
    reason
}

// ============================================================================
// Setup
// ============================================================================

fn resolve_filing(args: &RunArgs) -> Result<CaseFiling, MockTrialError> {
    let mut filing = if let Some(ref id) = args.sample {
        let sample = find_sample(id).ok_or_else(|| {
            let hint = suggest_sample(id)
                .map(|s| format!(" (did you mean '{s}'?)"))
                .unwrap_or_default();
            MockTrialError::Usage(format!("unknown sample '{id}'{hint}"))
        })?;
        sample.filing()
    } else if let Some(ref path) = args.case_file {
        CaseFiling::new(std::fs::read_to_string(path)?)
    } else if let Some(ref text) = args.case_text {
        CaseFiling::new(text.clone())
    } else {
        return Err(MockTrialError::Usage(
            "one of --case, --case-file or --sample is required".to_string(),
        ));
    };

    if let Some(ref title) = args.title {
        filing = filing.with_title(title.clone());
    }
    Ok(filing)
}

fn load_config(path: Option<&PathBuf>) -> Result<TrialConfig, MockTrialError> {
    let Some(path) = path else {
        return Ok(TrialConfig::default());
    };

    info!(config = %path.display(), "loading configuration");
    let result = ConfigLoader::with_defaults().load(path)?;
    for warning in &result.warnings {
        warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(TrialConfig::clone(&result.config))
}

type Collaborators = (Arc<dyn StatementGenerator>, Arc<dyn CaseAnalyzer>);

fn build_collaborators(config: &TrialConfig) -> Result<Collaborators, MockTrialError> {
    let Some(client) = ChatClient::from_config(&config.generation)? else {
        warn!(
            env = %config.generation.api_key_env,
            "no API key set; every statement will use placeholder text"
        );
        return Ok((Arc::new(UnconfiguredGenerator), Arc::new(FallbackAnalyzer)));
    };

    info!(model = client.model(), "statement generation configured");
    let analyzer: Arc<dyn CaseAnalyzer> = if config.intake.enabled {
        Arc::new(OpenAiCaseAnalyzer::new(
            client.clone(),
            config.intake.temperature,
        ))
    } else {
        Arc::new(FallbackAnalyzer)
    };
    let generator = Arc::new(OpenAiGenerator::new(
        client,
        config.generation.temperature,
        config.generation.max_tokens,
    ));
    Ok((generator, analyzer))
}

// ============================================================================
// Output
// ============================================================================

fn print_header(controller: &ProceedingController) {
    let (Some(proceeding), Some(registry)) = (controller.snapshot(), controller.registry())
    else {
        return;
    };

    println!("{}", proceeding.title);
    println!("{} v. {}", proceeding.party_a, proceeding.party_b);
    if !proceeding.key_issues.is_empty() {
        println!("Issues: {}", proceeding.key_issues.join("; "));
    }
    println!();
    for participant in registry.iter() {
        println!(
            "  {} {} ({})",
            participant.avatar,
            participant.name,
            participant.role.profile().title
        );
    }
}

fn spawn_printer(
    mut feed: tokio::sync::broadcast::Receiver<FeedEvent>,
    format: OutputFormat,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match feed.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "output fell behind; some events were not printed");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let last = matches!(event, FeedEvent::Concluded | FeedEvent::Reset);
            print_event(&event, format);
            if last {
                break;
            }
        }
    })
}

fn print_event(event: &FeedEvent, format: OutputFormat) {
    if format == OutputFormat::Json {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
        return;
    }

    match event {
        FeedEvent::Speaking { .. } => {}
        FeedEvent::Statement {
            message,
            speaker_name,
            ..
        } => {
            let marker = if message.placeholder {
                " (placeholder)"
            } else {
                ""
            };
            println!("{speaker_name}{marker}: {}", message.content);
            println!();
        }
        FeedEvent::PhaseEntered { label, .. } => {
            println!();
            println!("== {label} ==");
            println!();
        }
        FeedEvent::Concluded => println!("Court is adjourned."),
        FeedEvent::Reset => println!("Proceeding aborted."),
    }
}

fn finish(
    controller: &ProceedingController,
    settled: ControllerState,
    args: &RunArgs,
) -> Result<(), MockTrialError> {
    let Some(proceeding) = controller.snapshot() else {
        info!(state = %settled, "proceeding ended without a transcript");
        return Ok(());
    };

    if let Some(ref path) = args.transcript_out {
        let text = controller.export_transcript().unwrap_or_default();
        std::fs::write(path, text)?;
        info!(path = %path.display(), "transcript written");
    }

    let statements = proceeding.transcript.len();
    let placeholders = proceeding
        .transcript
        .messages()
        .iter()
        .filter(|m| m.placeholder)
        .count();

    match args.format {
        OutputFormat::Human => {
            println!();
            println!("{statements} statements ({placeholders} placeholders)");
            if args.transcript_out.is_none() {
                println!(
                    "Save with --transcript-out {}",
                    export::default_file_name(&proceeding.title)
                );
            }
        }
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "event": "summary",
                "proceeding_id": proceeding.id,
                "state": settled,
                "status": proceeding.status.to_string(),
                "phase": proceeding.current_phase,
                "statements": statements,
                "placeholders": placeholders,
            });
            println!("{summary}");
        }
    }
    Ok(())
}

// ============================================================================
// Interactive Control
// ============================================================================

/// A control command read from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlCommand {
    Pause,
    Resume,
    NextPhase,
    Reset,
    Export,
}

impl ControlCommand {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "p" | "pause" => Some(Self::Pause),
            "r" | "resume" => Some(Self::Resume),
            "n" | "next" => Some(Self::NextPhase),
            "x" | "reset" => Some(Self::Reset),
            "e" | "export" => Some(Self::Export),
            _ => None,
        }
    }
}

fn spawn_control(controller: ProceedingController, format: OutputFormat) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            let Some(command) = ControlCommand::parse(&line) else {
                eprintln!("unknown command '{}' (p, r, n, x, e)", line.trim());
                continue;
            };
            if apply(&controller, command, format) {
                break;
            }
        }
    })
}

/// Applies a command. Returns `true` once no further input is useful.
fn apply(controller: &ProceedingController, command: ControlCommand, format: OutputFormat) -> bool {
    let result = match command {
        ControlCommand::Pause => controller.pause(),
        ControlCommand::Resume => controller.resume(),
        ControlCommand::NextPhase => controller.advance_phase_manually(),
        ControlCommand::Reset => {
            controller.reset();
            return true;
        }
        ControlCommand::Export => {
            match controller.export_transcript() {
                Some(text) if format == OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "event": "export", "text": text }));
                }
                Some(text) => println!("{text}\n"),
                None => eprintln!("nothing to export"),
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{e}");
    }
    controller.state().is_settled()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> RunArgs {
        use clap::Parser;
        let mut full = vec!["mocktrial", "run"];
        full.extend_from_slice(argv);
        match crate::cli::args::Cli::try_parse_from(full).unwrap().command {
            crate::cli::args::Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn control_commands_parse_short_and_long_forms() {
        assert_eq!(ControlCommand::parse("p"), Some(ControlCommand::Pause));
        assert_eq!(ControlCommand::parse(" resume "), Some(ControlCommand::Resume));
        assert_eq!(ControlCommand::parse("n"), Some(ControlCommand::NextPhase));
        assert_eq!(ControlCommand::parse("x"), Some(ControlCommand::Reset));
        assert_eq!(ControlCommand::parse("e"), Some(ControlCommand::Export));
        assert_eq!(ControlCommand::parse("q"), None);
    }

    #[test]
    fn sample_filing_uses_sample_title() {
        let filing = resolve_filing(&args(&["--sample", "money-lending"])).unwrap();
        assert_eq!(filing.title.as_deref(), Some("The Unpaid Loan"));
    }

    #[test]
    fn title_flag_overrides() {
        let filing =
            resolve_filing(&args(&["--case", "They took my bike", "--title", "Bike"])).unwrap();
        assert_eq!(filing.title.as_deref(), Some("Bike"));
        assert_eq!(filing.description, "They took my bike");
    }

    #[test]
    fn unknown_sample_suggests_close_match() {
        let err = resolve_filing(&args(&["--sample", "money-lendin"])).unwrap_err();
        assert!(err.to_string().contains("did you mean 'money-lending'"));
        assert_eq!(err.exit_code(), crate::error::ExitCode::USAGE_ERROR);
    }

    #[test]
    fn missing_config_uses_defaults() {
        let config = load_config(None).unwrap();
        assert!(config.cast.is_empty());
        assert!(config.intake.enabled);
    }
}
