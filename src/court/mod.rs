//! Courtroom domain model
//!
//! Roles, participants, messages, and the proceeding record. These types
//! carry no sequencing logic; the phase rules live in [`crate::phase`] and
//! the driver lives in [`crate::controller`].

pub mod message;
pub mod participant;
pub mod proceeding;
pub mod role;

pub use message::{Message, MessageKind, Transcript};
pub use participant::{Participant, ParticipantRegistry, ParticipantSpec};
pub use proceeding::{CaseFiling, DEFAULT_TITLE, Proceeding, ProceedingStatus};
pub use role::{ROLE_PROFILES, Role, RoleProfile, VoiceProfile};
