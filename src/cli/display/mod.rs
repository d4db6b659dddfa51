//! Display framework for CLI output formatting.
//!
//! Shared primitives for tables and styled action lines used by every
//! command.

pub mod table;

use console::style;
use serde::Serialize;

use crate::infrastructure::logging::SecretScrubber;

pub use table::{list_table, record_table, render_list};

/// Trait for types that can be rendered as human-readable or JSON output.
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Dispatch output based on JSON mode flag.
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_json()).unwrap_or_default()
        );
    } else {
        println!("{}", result.to_human());
    }
}

/// Render a success action result.
pub fn action_success(message: &str) -> String {
    format!("{} {}", style("\u{2713}").green().bold(), message)
}

/// Render a failure action result.
pub fn action_failure(message: &str) -> String {
    format!("{} {}", style("\u{2717}").red().bold(), message)
}

/// Print an error to stderr (or as JSON on stdout) with secrets redacted.
pub fn report_error(err: &anyhow::Error, json_mode: bool) {
    let message = SecretScrubber::shared().scrub_message(&format!("{err:#}"));
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "error": message }))
                .unwrap_or_default()
        );
    } else {
        eprintln!("{}", action_failure(&message));
    }
}

/// Truncate a string to at most `max_len` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
