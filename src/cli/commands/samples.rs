//! `samples` command handler
//!
//! Lists the built-in sample cases.

use crate::cli::args::{OutputFormat, SamplesArgs};
use crate::error::MockTrialError;
use crate::samples::list_samples;

/// Print the built-in sample cases.
///
/// # Errors
///
/// Returns a JSON error if serialization fails.
pub fn run(args: &SamplesArgs) -> Result<(), MockTrialError> {
    let samples = list_samples(args.category);

    match args.format {
        OutputFormat::Human => {
            if samples.is_empty() {
                println!("No sample cases match.");
                return Ok(());
            }
            let width = samples.iter().map(|s| s.id.len()).max().unwrap_or(0);
            let mut category = None;
            for sample in samples {
                if category != Some(sample.category) {
                    if category.is_some() {
                        println!();
                    }
                    println!("{}", sample.category);
                    category = Some(sample.category);
                }
                println!("  {:<width$}  {}", sample.id, sample.title);
                println!("  {:<width$}  {}", "", sample.summary);
            }
            println!();
            println!("Run one with: mocktrial run --sample <ID>");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&samples)?);
        }
    }
    Ok(())
}
