//! Command-line interface for taskprobe.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands, ConfigCommands};

use crate::infrastructure::logging::SecretScrubber;

/// Print a command error and exit with a non-zero status
///
/// The full cause chain is printed; every line is scrubbed first because
/// remote error bodies are echoed verbatim.
pub fn handle_error(err: &anyhow::Error, json: bool, scrubber: &SecretScrubber) -> ! {
    let causes: Vec<String> = err
        .chain()
        .map(|cause| scrubber.scrub(&cause.to_string()))
        .collect();

    if json {
        let body = serde_json::json!({
            "error": causes.first().cloned().unwrap_or_default(),
            "causes": causes.iter().skip(1).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {}", causes.first().map_or("unknown error", String::as_str));
        for cause in causes.iter().skip(1) {
            eprintln!("  Caused by: {cause}");
        }
    }

    std::process::exit(1)
}
