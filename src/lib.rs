//! `MockTrial` - mock trial orchestration engine
//!
//! Drives a fixed cast of role-bound participants (judge, two counsel, and
//! a jury panel) through the phases of a courtroom proceeding. Statements
//! come from a pluggable generator; the engine decides who speaks, when a
//! phase is over, and how play/pause/reset interact with in-flight work.

pub mod cli;
pub mod config;
pub mod controller;
pub mod court;
pub mod error;
pub mod export;
pub mod generation;
pub mod intake;
pub mod observability;
pub mod phase;
pub mod samples;
