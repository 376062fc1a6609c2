//! Command-line interface
//!
//! Argument definitions and command handlers for the `mocktrial` binary.

pub mod args;
pub mod commands;
