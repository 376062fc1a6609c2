mod common;

use std::io::Write;

use common::spawn_command;

// ============================================================================
// version / samples
// ============================================================================

#[test]
fn version_human() {
    let output = spawn_command(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("mocktrial "), "got: {stdout}");
}

#[test]
fn version_json() {
    let output = spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("version JSON should be valid");
    assert_eq!(parsed["name"], "mocktrial");
    assert!(parsed.get("version").is_some());
}

#[test]
fn samples_lists_every_case() {
    let output = spawn_command(&["samples", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["id"].as_str())
        .collect();
    assert_eq!(
        ids,
        [
            "roommate-food",
            "group-project",
            "relationship-job",
            "money-lending",
            "work-plagiarism"
        ]
    );
}

#[test]
fn samples_human_groups_by_category() {
    let output = spawn_command(&["samples", "--category", "financial"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Financial Disputes"));
    assert!(stdout.contains("money-lending"));
    assert!(!stdout.contains("roommate-food"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_unconfigured_sample_completes() {
    let dir = tempfile::tempdir().unwrap();
    let transcript = dir.path().join("out.txt");
    let output = spawn_command(&[
        "run",
        "--sample",
        "roommate-food",
        "--fast",
        "--transcript-out",
        transcript.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "run should exit 0: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("The Great Food Theft"));
    assert!(stdout.contains("== Opening Statements =="));
    assert!(stdout.contains("== Final Verdict =="));
    assert!(stdout.contains("21 statements (21 placeholders)"));

    let text = std::fs::read_to_string(&transcript).unwrap();
    let entries = mocktrial::export::parse_transcript(&text);
    assert_eq!(entries.len(), 21);
    assert_eq!(entries[0].speaker, "Judge Martinez");
}

#[test]
fn run_json_emits_feed_events_and_summary() {
    let output = spawn_command(&["run", "--case", "They kept my bike", "--fast", "-f", "json"]);
    assert!(output.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line is JSON"))
        .collect();
    let statements = lines.iter().filter(|l| l["event"] == "statement").count();
    assert_eq!(statements, 21);

    let summary = lines.last().unwrap();
    assert_eq!(summary["event"], "summary");
    assert_eq!(summary["state"], "completed");
    assert_eq!(summary["phase"], "verdict");
    assert_eq!(summary["placeholders"], 21);
}

#[test]
fn run_writes_event_stream() {
    let dir = tempfile::tempdir().unwrap();
    let events = dir.path().join("events.jsonl");
    let output = spawn_command(&[
        "run",
        "--sample",
        "group-project",
        "--fast",
        "--events-file",
        events.to_str().unwrap(),
        "-q",
    ]);
    assert!(output.status.success());

    let content = std::fs::read_to_string(&events).unwrap();
    let types: Vec<String> = content
        .lines()
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).unwrap();
            v["type"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(types.first().map(String::as_str), Some("ProceedingStarted"));
    assert_eq!(types.last().map(String::as_str), Some("ProceedingCompleted"));
    assert_eq!(types.iter().filter(|t| *t == "GenerationFailed").count(), 21);
    assert_eq!(types.iter().filter(|t| *t == "PhaseEntered").count(), 6);
}

#[test]
fn run_unknown_sample_is_usage_error() {
    let output = spawn_command(&["run", "--sample", "roomate-food"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("did you mean 'roommate-food'"), "got: {stderr}");
}

#[test]
fn run_blank_case_is_rejected() {
    let output = spawn_command(&["run", "--case", "   ", "--fast"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn run_with_bad_config_fails_before_starting() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "pacing:\n  turn_delay: soon").unwrap();
    let output = spawn_command(&[
        "run",
        "--case",
        "dispute",
        "--config",
        config.path().to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[cfg(unix)]
#[test]
fn run_exits_143_on_sigterm() {
    use std::io::{BufRead, BufReader};
    use std::process::{Command, Stdio};

    let mut child = Command::new(env!("CARGO_BIN_EXE_mocktrial"))
        .args(["run", "--sample", "work-plagiarism", "-q"])
        .env_remove("OPENAI_API_KEY")
        .env_remove("MOCKTRIAL_CONFIG")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // The header is printed once the proceeding has started.
    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut header = String::new();
    stdout.read_line(&mut header).unwrap();
    assert!(!header.is_empty());

    let killed = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());
    assert_eq!(child.wait().unwrap().code(), Some(143));
    drop(stdout);
}

// ============================================================================
// config validate
// ============================================================================

#[test]
fn config_validate_accepts_good_file() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        config,
        "pacing:\n  turn_delay: 2s\ngeneration:\n  model: gpt-4o-mini\ncast:\n  - role: judge\n    name: Judge Judy\n  - role: counsel_plaintiff\n  - role: counsel_defendant\n  - role: panel\n"
    )
    .unwrap();
    let output = spawn_command(&["config", "validate", config.path().to_str().unwrap()]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stdout)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains(": ok"));
}

#[test]
fn config_validate_reports_issues_as_json() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "generation:\n  temperature: 3.5").unwrap();
    let output = spawn_command(&[
        "config",
        "validate",
        "--format",
        "json",
        config.path().to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["valid"], false);
    assert!(
        parsed[0]["errors"][0]
            .as_str()
            .unwrap()
            .contains("generation.temperature")
    );
}

#[test]
fn config_validate_missing_file_is_io_error() {
    let output = spawn_command(&["config", "validate", "/nonexistent/mocktrial.yaml"]);
    assert_eq!(output.status.code(), Some(3));
}
