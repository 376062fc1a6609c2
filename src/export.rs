//! Transcript export
//!
//! Renders a transcript as plain text, one entry per statement:
//!
//! ```text
//! [14:03:12] Judge Martinez: Court is now in session.
//!
//! [14:03:15] Attorney Sarah Chen: Your Honor, ...
//! ```
//!
//! Entries are joined by a blank line. Times are local wall-clock times.

use chrono::{Local, NaiveTime};
use serde::Serialize;

use crate::court::{Message, ParticipantRegistry, Transcript};

/// Display name used for speaker ids outside the registry.
pub const UNKNOWN_SPEAKER: &str = "Unknown";

const TIME_FORMAT: &str = "%H:%M:%S";

/// One entry read back from an exported transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    /// Wall-clock time of the statement.
    pub time: NaiveTime,
    /// Speaker display name.
    pub speaker: String,
    /// Statement text, possibly spanning several lines.
    pub content: String,
}

/// Renders a single message as an export entry.
#[must_use]
pub fn render_entry(message: &Message, registry: &ParticipantRegistry) -> String {
    let speaker = registry
        .get(&message.speaker_id)
        .map_or(UNKNOWN_SPEAKER, |p| p.name.as_str());
    let time = message.produced_at.with_timezone(&Local).format(TIME_FORMAT);
    format!("[{time}] {speaker}: {}", message.content)
}

/// Renders the whole transcript in speaking order.
#[must_use]
pub fn render_transcript(transcript: &Transcript, registry: &ParticipantRegistry) -> String {
    transcript
        .messages()
        .iter()
        .map(|m| render_entry(m, registry))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Reads an exported transcript back into entries.
///
/// A line of the form `[HH:MM:SS] name: text` starts an entry. Any other
/// line continues the previous entry's content; text before the first
/// entry is ignored. Content comes back byte for byte as rendered, line
/// endings and trailing newlines included, as long as none of its lines
/// looks like an entry header.
#[must_use]
pub fn parse_transcript(text: &str) -> Vec<TranscriptEntry> {
    let mut entries: Vec<TranscriptEntry> = Vec::new();

    for line in text.split('\n') {
        if let Some(entry) = parse_entry_line(line) {
            // Drop the line break contributed by the blank separator line.
            if let Some(previous) = entries.last_mut()
                && previous.content.ends_with('\n')
            {
                previous.content.pop();
            }
            entries.push(entry);
        } else if let Some(current) = entries.last_mut() {
            current.content.push('\n');
            current.content.push_str(line);
        }
    }
    entries
}

fn parse_entry_line(line: &str) -> Option<TranscriptEntry> {
    let rest = line.strip_prefix('[')?;
    let (time, rest) = rest.split_once("] ")?;
    if time.len() != 8 {
        return None;
    }
    let time = NaiveTime::parse_from_str(time, TIME_FORMAT).ok()?;
    let (speaker, content) = rest.split_once(": ")?;
    if speaker.is_empty() {
        return None;
    }
    Some(TranscriptEntry {
        time,
        speaker: speaker.to_string(),
        content: content.to_string(),
    })
}

/// Default export file name for a proceeding title.
///
/// Path separators and other characters unsafe in file names become `-`.
#[must_use]
pub fn default_file_name(title: &str) -> String {
    let title = title.trim();
    let stem: String = if title.is_empty() {
        "trial".to_string()
    } else {
        title
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
                c if c.is_control() => '-',
                c => c,
            })
            .collect()
    };
    format!("{stem}-transcript.txt")
}
