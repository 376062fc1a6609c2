//! Shared integration-test harness: scripted statement generators, a
//! controller factory, and helpers for running the `mocktrial` binary.

#![allow(dead_code)]

use std::collections::HashSet;
use std::process::Output;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use mocktrial::controller::{ControllerOptions, FeedEvent, Pacing, ProceedingController};
use mocktrial::court::ParticipantSpec;
use mocktrial::error::GenerationError;
use mocktrial::generation::{GenerationRequest, GenerationResponse, StatementGenerator};
use mocktrial::intake::FallbackAnalyzer;

// ============================================================================
// Generators
// ============================================================================

/// Answers every request with `"<speaker name> #<call index>"`.
///
/// Calls whose zero-based index is in `failing` return an error instead.
#[derive(Default)]
pub struct ScriptedGenerator {
    calls: AtomicUsize,
    failing: HashSet<usize>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing: calls.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatementGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let text = format!("{} #{n}", request.speaker_name);
        self.requests.lock().unwrap().push(request);
        if self.failing.contains(&n) {
            return Err(GenerationError::Network("connection reset".to_string()));
        }
        Ok(GenerationResponse { text })
    }
}

/// Holds every request until the test releases a permit.
pub struct GatedGenerator {
    gate: Semaphore,
    started: AtomicUsize,
}

impl GatedGenerator {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
        }
    }

    /// Lets `n` held or future requests complete.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Number of requests that have been issued.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatementGenerator for GatedGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let n = self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();
        Ok(GenerationResponse {
            text: format!("{} (gated #{n})", request.speaker_name),
        })
    }
}

/// Always answers with blank text.
pub struct SilentGenerator;

#[async_trait]
impl StatementGenerator for SilentGenerator {
    async fn generate(
        &self,
        _request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        Ok(GenerationResponse {
            text: "   ".to_string(),
        })
    }
}

// ============================================================================
// Controllers
// ============================================================================

/// Controller with zero pacing, the fallback analyzer, and the default cast.
pub fn controller(generator: Arc<dyn StatementGenerator>) -> ProceedingController {
    controller_with_cast(generator, Vec::new())
}

/// Controller with zero pacing and the given cast.
pub fn controller_with_cast(
    generator: Arc<dyn StatementGenerator>,
    cast: Vec<ParticipantSpec>,
) -> ProceedingController {
    ProceedingController::new(
        generator,
        Arc::new(FallbackAnalyzer),
        ControllerOptions {
            pacing: Pacing::immediate(),
            cast,
            ..ControllerOptions::default()
        },
    )
}

/// Lets spawned ticks run until the runtime is idle.
///
/// Under a paused clock the sleep only completes once every other task is
/// blocked, so zero-delay ticks all get to run first.
pub async fn settle_tasks() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Waits until `condition` holds, panicking after a generous bound.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        settle_tasks().await;
    }
    panic!("condition not reached");
}

/// Drains every feed event currently buffered.
pub fn drain(feed: &mut tokio::sync::broadcast::Receiver<FeedEvent>) -> Vec<FeedEvent> {
    let mut events = Vec::new();
    while let Ok(event) = feed.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Binary
// ============================================================================

/// Runs the `mocktrial` binary to completion with a clean environment for
/// the API key, so no network calls are attempted.
pub fn spawn_command(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_mocktrial"))
        .args(args)
        .env_remove("OPENAI_API_KEY")
        .env_remove("MOCKTRIAL_CONFIG")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run mocktrial")
}
