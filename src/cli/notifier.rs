//! Terminal rendering of session notifications.

use console::style;

use crate::domain::ports::SessionNotifier;

/// Prints a styled "session expired" notice on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    pub fn notice() -> String {
        format!(
            "{} {}",
            style("Session expired.").yellow().bold(),
            style("Run `tablefetch login` to sign in again.").dim()
        )
    }
}

impl SessionNotifier for TerminalNotifier {
    fn session_expired(&self) {
        tracing::warn!("session expired, stored token cleared");
        eprintln!("{}", Self::notice());
    }
}
