//! Proceeding controller
//!
//! The stateful driver. It asks the turn selector who speaks, requests the
//! statement from the generator, appends it, consults the advancement
//! policy, and schedules the next step, all under play/pause/reset control.
//!
//! Concurrency model:
//! - All mutable state sits behind one mutex that is never held across an
//!   `.await`.
//! - At most one generation request is in flight; a tick that finds one
//!   outstanding does nothing.
//! - Every scheduled tick and every request carries the controller epoch.
//!   `start`, `pause`, `reset`, and manual advance bump the epoch, so ticks
//!   and responses from before the bump are inert.
//! - A stale response that arrives while running with nothing scheduled
//!   schedules a tick, so progress never stalls on a discarded request.

pub mod feed;
pub mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::court::{
    CaseFiling, Message, Participant, ParticipantRegistry, ParticipantSpec, Proceeding,
};
use crate::error::{GenerationError, ProceedingError};
use crate::export;
use crate::generation::{GenerationRequest, GenerationResponse, StatementGenerator};
use crate::intake::CaseAnalyzer;
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;
use crate::phase::{LedgerAdvance, PhaseKey, PhaseLedger, is_phase_complete, next_speaker};

pub use feed::{DEFAULT_FEED_CAPACITY, FeedEvent};
pub use state::{ControllerState, Pacing};

// ============================================================================
// Options
// ============================================================================

/// Construction options for a [`ProceedingController`].
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Delays between automatic steps.
    pub pacing: Pacing,
    /// Cast overrides; empty seats the default cast.
    pub cast: Vec<ParticipantSpec>,
    /// Structured event sink.
    pub emitter: Arc<EventEmitter>,
    /// Presentation feed buffer size.
    pub feed_capacity: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            cast: Vec::new(),
            emitter: Arc::new(EventEmitter::noop()),
            feed_capacity: DEFAULT_FEED_CAPACITY,
        }
    }
}

// ============================================================================
// Internal State
// ============================================================================

/// One seated proceeding.
#[derive(Debug)]
struct Session {
    proceeding: Proceeding,
    registry: ParticipantRegistry,
    ledger: PhaseLedger,
}

/// An outstanding generation request.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    request_id: u64,
    epoch: u64,
}

#[derive(Debug, Default)]
struct Core {
    state: ControllerState,
    epoch: u64,
    session: Option<Session>,
    in_flight: Option<InFlight>,
    next_request_id: u64,
    /// Scheduled tick id and its cancellation token.
    pending_tick: Option<(u64, CancellationToken)>,
    next_tick_id: u64,
}

impl Core {
    fn cancel_pending_tick(&mut self) {
        if let Some((_, token)) = self.pending_tick.take() {
            token.cancel();
        }
    }

    fn invalid(&self, operation: &'static str) -> ProceedingError {
        ProceedingError::InvalidTransition {
            operation,
            state: self.state.to_string(),
        }
    }
}

/// What a tick decided to do once the lock is released.
struct TurnPlan {
    request: GenerationRequest,
    in_flight: InFlight,
    speaker: Participant,
    phase: PhaseKey,
}

struct Inner {
    generator: Arc<dyn StatementGenerator>,
    analyzer: Arc<dyn CaseAnalyzer>,
    options: ControllerOptions,
    core: Mutex<Core>,
    feed: broadcast::Sender<FeedEvent>,
    state_tx: watch::Sender<ControllerState>,
}

// ============================================================================
// Public Handle
// ============================================================================

/// Drives one proceeding at a time through its phases.
///
/// Cheap to clone; clones share the same proceeding.
#[derive(Clone)]
pub struct ProceedingController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ProceedingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("ProceedingController")
            .field("state", &core.state)
            .field("epoch", &core.epoch)
            .field("in_flight", &core.in_flight.is_some())
            .finish_non_exhaustive()
    }
}

impl ProceedingController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(
        generator: Arc<dyn StatementGenerator>,
        analyzer: Arc<dyn CaseAnalyzer>,
        options: ControllerOptions,
    ) -> Self {
        let (feed, _) = broadcast::channel(options.feed_capacity.max(1));
        let (state_tx, _) = watch::channel(ControllerState::Idle);
        Self {
            inner: Arc::new(Inner {
                generator,
                analyzer,
                options,
                core: Mutex::new(Core::default()),
                feed,
                state_tx,
            }),
        }
    }

    /// Opens and starts a proceeding for `filing`.
    ///
    /// Runs case intake, seats the cast, enters the opening phase, and
    /// schedules the first turn. A completed proceeding is replaced.
    ///
    /// # Errors
    ///
    /// Returns `ProceedingError::MissingDescription` for a blank description
    /// (before any state is touched), or `ProceedingError::InvalidTransition`
    /// while a proceeding is running or paused.
    pub async fn start(&self, filing: CaseFiling) -> Result<uuid::Uuid, ProceedingError> {
        filing.validate()?;
        {
            let core = self.inner.lock();
            if core.state.is_active() {
                return Err(core.invalid("start"));
            }
        }

        let analysis = self.inner.analyzer.analyze(filing.description.trim()).await;

        let mut core = self.inner.lock();
        if core.state.is_active() {
            return Err(core.invalid("start"));
        }

        let mut proceeding = Proceeding::open(&filing, analysis);
        proceeding.activate();
        let id = proceeding.id;
        let id_str = id.to_string();
        let registry = seat_cast(&self.inner.options.cast, &id_str);
        let ledger = PhaseLedger::new();
        let opening = ledger.current_key();

        info!(
            proceeding_id = %id,
            title = %proceeding.title,
            participants = registry.len(),
            "proceeding started"
        );
        self.inner.options.emitter.emit(Event::ProceedingStarted {
            timestamp: Utc::now(),
            proceeding_id: id,
            title: proceeding.title.clone(),
            participants: registry.len(),
        });

        core.cancel_pending_tick();
        core.epoch += 1;
        core.in_flight = None;
        core.session = Some(Session {
            proceeding,
            registry,
            ledger,
        });
        self.inner.set_state(&mut core, ControllerState::Running);
        self.inner.announce_phase(opening, None, false);
        self.inner
            .schedule_tick(&mut core, self.inner.options.pacing.initial_delay);
        Ok(id)
    }

    /// Halts automatic progression.
    ///
    /// Any scheduled turn is cancelled and an in-flight response will be
    /// discarded when it arrives.
    ///
    /// # Errors
    ///
    /// Returns `ProceedingError::InvalidTransition` unless running.
    pub fn pause(&self) -> Result<(), ProceedingError> {
        let mut core = self.inner.lock();
        if core.state != ControllerState::Running {
            return Err(core.invalid("pause"));
        }
        core.cancel_pending_tick();
        core.epoch += 1;
        self.inner.set_state(&mut core, ControllerState::Paused);
        info!("proceeding paused");
        self.inner.options.emitter.emit(Event::ProceedingPaused {
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Resumes automatic progression.
    ///
    /// The next turn is scheduled only if no request is in flight; an
    /// outstanding response reschedules when it arrives.
    ///
    /// # Errors
    ///
    /// Returns `ProceedingError::InvalidTransition` unless paused.
    pub fn resume(&self) -> Result<(), ProceedingError> {
        let mut core = self.inner.lock();
        if core.state != ControllerState::Paused {
            return Err(core.invalid("resume"));
        }
        self.inner.set_state(&mut core, ControllerState::Running);
        info!("proceeding resumed");
        self.inner.options.emitter.emit(Event::ProceedingResumed {
            timestamp: Utc::now(),
        });
        if core.in_flight.is_none() {
            self.inner
                .schedule_tick(&mut core, self.inner.options.pacing.resume_delay);
        }
        Ok(())
    }

    /// Completes the current phase immediately and moves to the next one.
    ///
    /// At the verdict phase this completes the proceeding. When running,
    /// the first turn of the new phase is scheduled.
    ///
    /// # Errors
    ///
    /// Returns `ProceedingError::InvalidTransition` unless running or paused.
    pub fn advance_phase_manually(&self) -> Result<(), ProceedingError> {
        let mut core = self.inner.lock();
        if !core.state.is_active() {
            return Err(core.invalid("advance the phase"));
        }
        core.cancel_pending_tick();
        core.epoch += 1;
        info!("phase advanced manually");
        self.inner.advance_phase(&mut core, true);
        Ok(())
    }

    /// Discards the proceeding and returns to idle. Valid in any state.
    pub fn reset(&self) {
        let mut core = self.inner.lock();
        core.cancel_pending_tick();
        core.epoch += 1;
        core.in_flight = None;
        let previous = core.state;
        let session = core.session.take();
        let phase = session.as_ref().map(|s| s.ledger.current_key());

        if let Some(phase) = phase {
            metrics::clear_current_phase(phase);
        }
        if previous.is_active() {
            metrics::record_proceeding("reset");
        }

        self.inner.set_state(&mut core, ControllerState::Idle);
        info!(previous = %previous, "proceeding reset");
        self.inner.options.emitter.emit(Event::ProceedingReset {
            timestamp: Utc::now(),
            phase,
        });
        self.inner.publish(FeedEvent::Reset);
    }

    /// Current play state.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.inner.lock().state
    }

    /// Returns `true` while a generation request is outstanding.
    #[must_use]
    pub fn is_request_in_flight(&self) -> bool {
        self.inner.lock().in_flight.is_some()
    }

    /// Copy of the current proceeding, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Proceeding> {
        self.inner
            .lock()
            .session
            .as_ref()
            .map(|s| s.proceeding.clone())
    }

    /// Copy of the phase ledger, if a proceeding exists.
    #[must_use]
    pub fn ledger(&self) -> Option<PhaseLedger> {
        self.inner.lock().session.as_ref().map(|s| s.ledger.clone())
    }

    /// Copy of the participant registry, if a proceeding exists.
    #[must_use]
    pub fn registry(&self) -> Option<ParticipantRegistry> {
        self.inner
            .lock()
            .session
            .as_ref()
            .map(|s| s.registry.clone())
    }

    /// Subscribes to the presentation feed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.inner.feed.subscribe()
    }

    /// Watches play-state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ControllerState> {
        self.inner.state_tx.subscribe()
    }

    /// Waits until the controller is idle or completed, and returns that state.
    pub async fn wait_until_settled(&self) -> ControllerState {
        let mut rx = self.watch_state();
        match rx.wait_for(|s| s.is_settled()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }

    /// Renders the transcript as plain text, if a proceeding exists.
    #[must_use]
    pub fn export_transcript(&self) -> Option<String> {
        let core = self.inner.lock();
        core.session
            .as_ref()
            .map(|s| export::render_transcript(&s.proceeding.transcript, &s.registry))
    }
}

// ============================================================================
// Driver
// ============================================================================

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, core: &mut Core, state: ControllerState) {
        core.state = state;
        self.state_tx.send_replace(state);
    }

    fn publish(&self, event: FeedEvent) {
        let _ = self.feed.send(event);
    }

    /// Schedules a tick after `delay`, replacing any scheduled tick.
    fn schedule_tick(self: &Arc<Self>, core: &mut Core, delay: std::time::Duration) {
        core.cancel_pending_tick();
        core.next_tick_id += 1;
        let tick_id = core.next_tick_id;
        let epoch = core.epoch;
        let token = CancellationToken::new();
        core.pending_tick = Some((tick_id, token.clone()));

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => inner.tick(epoch, tick_id).await,
            }
        });
    }

    /// One automatic step.
    async fn tick(self: Arc<Self>, epoch: u64, tick_id: u64) {
        let Some(plan) = self.plan_turn(epoch, tick_id) else {
            return;
        };

        debug!(
            speaker = %plan.speaker.id,
            phase = %plan.phase,
            "requesting statement"
        );
        self.publish(FeedEvent::Speaking {
            participant_id: plan.speaker.id.clone(),
        });

        let result = self.generator.generate(plan.request).await;

        self.on_response(plan.in_flight, &plan.speaker, plan.phase, result);
    }

    /// Decides the next step under the lock. Returns a plan when a request
    /// should be issued.
    fn plan_turn(self: &Arc<Self>, epoch: u64, tick_id: u64) -> Option<TurnPlan> {
        let mut core = self.lock();
        if core.epoch != epoch || core.state != ControllerState::Running {
            return None;
        }
        if core.pending_tick.as_ref().map(|(id, _)| *id) != Some(tick_id) {
            return None;
        }
        core.pending_tick = None;
        if core.in_flight.is_some() {
            debug!("tick skipped; a request is already in flight");
            return None;
        }

        let session = core.session.as_ref()?;
        let phase = session.ledger.current_key();
        let count = session
            .ledger
            .phase_message_count(session.proceeding.transcript.messages());

        let Some(speaker) = next_speaker(phase, count, &session.registry).cloned() else {
            debug!(phase = %phase, count, "no further speaker; phase exhausted");
            self.advance_phase(&mut core, false);
            return None;
        };

        let request = GenerationRequest::for_turn(
            &speaker,
            session.proceeding.case_context(),
            session.proceeding.transcript.messages(),
            &session.registry,
            phase.label(),
        );

        core.next_request_id += 1;
        let in_flight = InFlight {
            request_id: core.next_request_id,
            epoch,
        };
        core.in_flight = Some(in_flight);

        Some(TurnPlan {
            request,
            in_flight,
            speaker,
            phase,
        })
    }

    /// Handles a generation outcome.
    fn on_response(
        self: &Arc<Self>,
        issued: InFlight,
        speaker: &Participant,
        phase: PhaseKey,
        result: Result<GenerationResponse, GenerationError>,
    ) {
        let mut core = self.lock();

        let owns_slot = core
            .in_flight
            .is_some_and(|f| f.request_id == issued.request_id);
        if owns_slot {
            core.in_flight = None;
        }

        if !owns_slot || core.epoch != issued.epoch {
            debug!(speaker = %speaker.id, "discarding stale response");
            if owns_slot
                && core.state == ControllerState::Running
                && core.pending_tick.is_none()
            {
                self.schedule_tick(&mut core, self.options.pacing.resume_delay);
            }
            return;
        }

        let message = self.build_message(speaker, phase, result);
        let Some(session) = core.session.as_mut() else {
            return;
        };

        let event = Event::StatementRecorded {
            timestamp: Utc::now(),
            message_id: message.id,
            speaker_id: message.speaker_id.clone(),
            role: speaker.role,
            phase,
            kind: message.kind,
            placeholder: message.placeholder,
        };
        if let Err(e) = session.proceeding.record(message.clone(), &session.registry) {
            error!(error = %e, "failed to append statement");
            return;
        }
        metrics::record_statement(speaker.role, phase);
        self.options.emitter.emit(event);
        self.publish(FeedEvent::Statement {
            speaker_id: message.speaker_id.clone(),
            speaker_name: speaker.name.clone(),
            message,
        });

        let count = session
            .ledger
            .phase_message_count(session.proceeding.transcript.messages());
        if is_phase_complete(phase, count) {
            self.advance_phase(&mut core, false);
        } else {
            self.schedule_tick(&mut core, self.options.pacing.turn_delay);
        }
    }

    /// Turns a generation outcome into a message, substituting the role's
    /// placeholder on failure or blank text.
    fn build_message(
        &self,
        speaker: &Participant,
        phase: PhaseKey,
        result: Result<GenerationResponse, GenerationError>,
    ) -> Message {
        let failure = match result {
            Ok(response) if !response.text.trim().is_empty() => {
                return Message::new(&speaker.id, speaker.role, phase, response.text);
            }
            Ok(_) => GenerationError::EmptyResponse,
            Err(e) => e,
        };

        warn!(
            speaker = %speaker.id,
            role = %speaker.role,
            error = %failure,
            "statement generation failed; using placeholder"
        );
        metrics::record_generation_failure(speaker.role);
        self.options.emitter.emit(Event::GenerationFailed {
            timestamp: Utc::now(),
            role: speaker.role,
            error: failure.to_string(),
        });
        placeholder_message(speaker, phase)
    }

    /// Completes the current phase and moves on, or completes the proceeding
    /// at the verdict.
    fn advance_phase(self: &Arc<Self>, core: &mut Core, manual: bool) {
        let Some(session) = core.session.as_mut() else {
            return;
        };
        let transcript_len = session.proceeding.transcript.len();

        match session.ledger.advance(transcript_len) {
            LedgerAdvance::Entered { from, to } => {
                session.proceeding.enter_phase(to);
                metrics::record_phase_transition(from, to);
                self.announce_phase(to, Some(from), manual);
                if core.state == ControllerState::Running {
                    self.schedule_tick(core, self.options.pacing.phase_delay);
                }
            }
            LedgerAdvance::Concluded => {
                session.proceeding.conclude();
                let statements = session.proceeding.transcript.len();
                let placeholders = session
                    .proceeding
                    .transcript
                    .messages()
                    .iter()
                    .filter(|m| m.placeholder)
                    .count();
                let proceeding_id = session.proceeding.id;

                core.cancel_pending_tick();
                core.epoch += 1;
                self.set_state(core, ControllerState::Completed);

                metrics::clear_current_phase(PhaseKey::Verdict);
                metrics::record_proceeding("completed");
                info!(
                    proceeding_id = %proceeding_id,
                    statements,
                    placeholders,
                    "proceeding completed"
                );
                self.options.emitter.emit(Event::ProceedingCompleted {
                    timestamp: Utc::now(),
                    proceeding_id,
                    statements,
                    placeholders,
                });
                self.publish(FeedEvent::Concluded);
            }
            LedgerAdvance::AlreadyConcluded => {}
        }
    }

    fn announce_phase(&self, phase: PhaseKey, previous: Option<PhaseKey>, manual: bool) {
        metrics::set_current_phase(phase, previous);
        info!(phase = %phase, label = phase.label(), manual, "phase entered");
        self.options.emitter.emit(Event::PhaseEntered {
            timestamp: Utc::now(),
            phase,
            phase_index: phase.index(),
            manual,
        });
        self.publish(FeedEvent::PhaseEntered {
            phase,
            label: phase.label().to_string(),
        });
    }
}

fn placeholder_message(speaker: &Participant, phase: PhaseKey) -> Message {
    let text = speaker.role.profile().placeholder;
    Message::new(&speaker.id, speaker.role, phase, text).into_placeholder()
}

/// Seats `cast`, or the default cast when it is empty.
fn seat_cast(cast: &[ParticipantSpec], proceeding_id: &str) -> ParticipantRegistry {
    if cast.is_empty() {
        ParticipantRegistry::default_cast(proceeding_id)
    } else {
        ParticipantRegistry::from_specs(proceeding_id, cast)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::court::Role;
    use crate::generation::UnconfiguredGenerator;
    use crate::intake::FallbackAnalyzer;

    fn controller() -> ProceedingController {
        ProceedingController::new(
            Arc::new(UnconfiguredGenerator),
            Arc::new(FallbackAnalyzer),
            ControllerOptions {
                pacing: Pacing::immediate(),
                ..ControllerOptions::default()
            },
        )
    }

    #[tokio::test]
    async fn blank_description_creates_no_state() {
        let c = controller();
        let err = c.start(CaseFiling::new("  ")).await.unwrap_err();
        assert!(matches!(err, ProceedingError::MissingDescription));
        assert_eq!(c.state(), ControllerState::Idle);
        assert!(c.snapshot().is_none());
    }

    #[tokio::test]
    async fn pause_and_resume_require_matching_state() {
        let c = controller();
        assert!(matches!(
            c.pause(),
            Err(ProceedingError::InvalidTransition { operation: "pause", .. })
        ));
        assert!(c.resume().is_err());
        assert!(c.advance_phase_manually().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_rejected_while_running() {
        let c = controller();
        c.start(CaseFiling::new("dispute")).await.unwrap();
        c.pause().unwrap();
        let err = c.start(CaseFiling::new("another")).await.unwrap_err();
        assert_eq!(err.to_string(), "cannot start while paused");
        c.reset();
        assert_eq!(c.state(), ControllerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn unconfigured_run_completes_with_placeholders() {
        let c = controller();
        c.start(CaseFiling::new("dispute")).await.unwrap();
        assert_eq!(c.wait_until_settled().await, ControllerState::Completed);

        let proceeding = c.snapshot().unwrap();
        // 3 + 6 + 6 + 3 + 1 + 2
        assert_eq!(proceeding.transcript.len(), 21);
        assert!(proceeding.transcript.messages().iter().all(|m| m.placeholder));
        assert!(c.ledger().unwrap().is_concluded());
        assert!(!c.is_request_in_flight());
    }

    #[test]
    fn empty_cast_seats_everyone() {
        let roles: Vec<Role> = seat_cast(&[], "p").iter().map(|p| p.role).collect();
        assert_eq!(roles, Role::ALL);
        let cast = [ParticipantSpec::defaults_for(Role::Judge)];
        assert_eq!(seat_cast(&cast, "p").len(), 1);
    }
}
