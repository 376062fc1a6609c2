//! Configuration module
//!
//! Loads and validates `MockTrial` configuration files: pacing, the
//! generation backend, case intake, and cast overrides.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
