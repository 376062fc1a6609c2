//! Structured event stream for `MockTrial`.
//!
//! Discrete, typed events emitted while a proceeding runs. Events are
//! serialized as newline-delimited JSON (JSONL) with a monotonically
//! increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::court::{MessageKind, Role};
use crate::phase::PhaseKey;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a proceeding.
///
/// Serialized with a `"type"` tag so consumers can dispatch on the kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A proceeding was opened and seated.
    ProceedingStarted {
        /// When the proceeding started.
        timestamp: DateTime<Utc>,
        /// Proceeding id.
        proceeding_id: Uuid,
        /// Case title.
        title: String,
        /// Number of seated participants.
        participants: usize,
    },

    /// A phase became current.
    PhaseEntered {
        /// When the phase was entered.
        timestamp: DateTime<Utc>,
        /// Phase key.
        phase: PhaseKey,
        /// Zero-based index of the phase.
        phase_index: usize,
        /// Whether the advance was forced by the operator.
        manual: bool,
    },

    /// A statement was appended to the transcript.
    StatementRecorded {
        /// When the statement was appended.
        timestamp: DateTime<Utc>,
        /// Message id.
        message_id: Uuid,
        /// Speaking participant id.
        speaker_id: String,
        /// Speaking role.
        role: Role,
        /// Phase during which it was made.
        phase: PhaseKey,
        /// Derived message kind.
        kind: MessageKind,
        /// Whether placeholder text was substituted.
        placeholder: bool,
    },

    /// The generator failed and placeholder text was used.
    GenerationFailed {
        /// When the failure was observed.
        timestamp: DateTime<Utc>,
        /// Role whose turn failed.
        role: Role,
        /// Error description.
        error: String,
    },

    /// Automatic progression was paused.
    ProceedingPaused {
        /// When the pause took effect.
        timestamp: DateTime<Utc>,
    },

    /// Automatic progression resumed.
    ProceedingResumed {
        /// When the resume took effect.
        timestamp: DateTime<Utc>,
    },

    /// The verdict phase completed.
    ProceedingCompleted {
        /// When the proceeding completed.
        timestamp: DateTime<Utc>,
        /// Proceeding id.
        proceeding_id: Uuid,
        /// Number of statements in the transcript.
        statements: usize,
        /// Number of placeholder statements.
        placeholders: usize,
    },

    /// The controller discarded its proceeding and returned to idle.
    ProceedingReset {
        /// When the reset happened.
        timestamp: DateTime<Utc>,
        /// Phase that was current, if a proceeding existed.
        phase: Option<PhaseKey>,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// writes one JSON line, and flushes. Serialization or I/O failures are
/// dropped; event output never interrupts a proceeding.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::noop()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    /// In-memory writer for capturing emitter output in tests.
    #[derive(Clone)]
    struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        fn contents(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn phase_entered() -> Event {
        Event::PhaseEntered {
            timestamp: DateTime::parse_from_rfc3339("2025-02-04T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            phase: PhaseKey::CrossExamination,
            phase_index: 2,
            manual: false,
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_value(phase_entered()).unwrap();
        assert_eq!(json["type"], "PhaseEntered");
        assert_eq!(json["phase"], "cross_examination");
        assert_eq!(json["phase_index"], 2);
    }

    #[test]
    fn emitter_writes_sequenced_jsonl() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(phase_entered());
        emitter.emit(Event::ProceedingPaused {
            timestamp: Utc::now(),
        });

        assert_eq!(emitter.event_count(), 2);

        let lines: Vec<serde_json::Value> = tw
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[0]["type"], "PhaseEntered");
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["type"], "ProceedingPaused");
        assert!(lines[0].get("event").is_none(), "event should be flattened");
    }

    #[test]
    fn statement_event_uses_snake_case_enums() {
        let json = serde_json::to_value(Event::StatementRecorded {
            timestamp: Utc::now(),
            message_id: Uuid::nil(),
            speaker_id: "panel-p".to_owned(),
            role: Role::Panel,
            phase: PhaseKey::Verdict,
            kind: MessageKind::Verdict,
            placeholder: true,
        })
        .unwrap();
        assert_eq!(json["role"], "panel");
        assert_eq!(json["kind"], "verdict");
        assert_eq!(json["placeholder"], true);
    }

    #[test]
    fn noop_emitter_counts_but_discards() {
        let emitter = EventEmitter::noop();
        emitter.emit(Event::ProceedingReset {
            timestamp: Utc::now(),
            phase: None,
        });
        assert_eq!(emitter.event_count(), 1);
    }
}
