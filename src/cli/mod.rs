//! Command-line interface for tablefetch.

pub mod commands;
pub mod context;
pub mod display;
pub mod notifier;
pub mod types;

pub use context::{load_config, CliContext};
pub use notifier::TerminalNotifier;
pub use types::{Cli, Commands, ListArgs, LoginArgs};
