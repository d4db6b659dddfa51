/// Sink for user-visible session notifications
///
/// The client calls `session_expired` once when a refresh fails for a
/// session that held a token and the session has been cleared.
pub trait SessionNotifier: Send + Sync {
    fn session_expired(&self);
}

/// Notifier that only writes a warning to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl SessionNotifier for LogNotifier {
    fn session_expired(&self) {
        tracing::warn!("session expired, please log in again");
    }
}
