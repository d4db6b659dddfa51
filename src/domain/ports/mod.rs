//! Port trait definitions (Hexagonal Architecture)
//!
//! - SessionStore: where the live access token is kept
//! - SessionNotifier: user-visible "session expired" channel

pub mod notifier;
pub mod session_store;

pub use notifier::{LogNotifier, SessionNotifier};
pub use session_store::SessionStore;
