//! Presentation feed.
//!
//! Rendering layers subscribe to a broadcast of [`FeedEvent`]s. Sending
//! never blocks the controller; receivers that fall behind lose events.

use serde::Serialize;

use crate::court::Message;
use crate::phase::PhaseKey;

/// Default number of buffered feed events per receiver.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Something a rendering layer may want to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A participant is about to speak.
    Speaking {
        /// Participant id.
        participant_id: String,
    },
    /// A statement was appended to the transcript.
    Statement {
        /// The recorded message.
        message: Message,
        /// Speaker participant id.
        speaker_id: String,
        /// Speaker display name.
        speaker_name: String,
    },
    /// A phase became current.
    PhaseEntered {
        /// Phase key.
        phase: PhaseKey,
        /// Phase label.
        label: String,
    },
    /// The proceeding completed.
    Concluded,
    /// The controller was reset.
    Reset,
}
