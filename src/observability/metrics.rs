//! Metrics collection for `MockTrial`.
//!
//! Prometheus-compatible metrics recorded through the `metrics` facade.
//! Label values come from closed enums, so cardinality is bounded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::court::Role;
use crate::error::MockTrialError;
use crate::phase::PhaseKey;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// With `Some(port)` a Prometheus HTTP listener is bound on
/// `127.0.0.1:<port>`; with `None` the recorder is installed without one.
///
/// # Errors
///
/// Returns `MockTrialError::Io` if the recorder or listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), MockTrialError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| MockTrialError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "mocktrial_statements_total",
        "Statements recorded, by role and phase"
    );
    describe_counter!(
        "mocktrial_phase_transitions_total",
        "Total number of phase transitions"
    );
    describe_gauge!(
        "mocktrial_current_phase",
        "Currently active phase (1 = active)"
    );
    describe_counter!(
        "mocktrial_generation_failures_total",
        "Generation failures replaced by placeholder text"
    );
    describe_histogram!(
        "mocktrial_generation_duration_ms",
        "Statement generation latency in milliseconds"
    );
    describe_counter!(
        "mocktrial_proceedings_total",
        "Proceedings finished, by outcome"
    );
}

/// Records an appended statement.
pub fn record_statement(role: Role, phase: PhaseKey) {
    counter!(
        "mocktrial_statements_total",
        "role" => role.as_str(),
        "phase" => phase.as_str(),
    )
    .increment(1);
}

/// Records a phase transition.
pub fn record_phase_transition(from: PhaseKey, to: PhaseKey) {
    counter!(
        "mocktrial_phase_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str(),
    )
    .increment(1);
}

/// Sets the current phase gauge, zeroing the previous phase's label.
pub fn set_current_phase(phase: PhaseKey, previous: Option<PhaseKey>) {
    if let Some(prev) = previous {
        gauge!("mocktrial_current_phase", "phase" => prev.as_str()).set(0.0);
    }
    gauge!("mocktrial_current_phase", "phase" => phase.as_str()).set(1.0);
}

/// Clears the current phase gauge.
pub fn clear_current_phase(phase: PhaseKey) {
    gauge!("mocktrial_current_phase", "phase" => phase.as_str()).set(0.0);
}

/// Records a generation failure that was replaced by a placeholder.
pub fn record_generation_failure(role: Role) {
    counter!("mocktrial_generation_failures_total", "role" => role.as_str()).increment(1);
}

/// Records generation latency.
pub fn record_generation_duration(duration: Duration) {
    histogram!("mocktrial_generation_duration_ms").record(duration.as_secs_f64() * 1000.0);
}

/// Records a finished proceeding (`completed` or `reset`).
pub fn record_proceeding(outcome: &'static str) {
    counter!("mocktrial_proceedings_total", "outcome" => outcome).increment(1);
}
