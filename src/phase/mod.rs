//! Phase sequencing
//!
//! The ordered phase ledger, the turn selector, and the advancement policy.
//! Everything here is synchronous and free of I/O; the controller drives it.

pub mod ledger;
pub mod policy;
pub mod turn;

pub use ledger::{LedgerAdvance, Phase, PhaseKey, PhaseLedger};
pub use policy::{is_phase_complete, is_phase_complete_for_key, threshold};
pub use turn::{next_role, next_role_for_key, next_speaker};
