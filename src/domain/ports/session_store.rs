//! Session store port (trait) for dependency injection.
//!
//! The client reads the live session before every request and writes it
//! only on refresh, login and logout. Implementations decide where the
//! session lives (process memory, a file shared between CLI runs, ...).
use crate::domain::models::Session;
use async_trait::async_trait;

/// Owner of the single live session
///
/// Writes never fail from the caller's point of view: adapters that persist
/// the session keep the in-memory value authoritative and log persistence
/// errors.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session
    async fn snapshot(&self) -> Session;

    /// Store a new access token and return the resulting session
    async fn replace_token(&self, token: String) -> Session;

    /// Drop the access token and return the resulting session
    async fn clear(&self) -> Session;

    /// Cookies an earlier process saved, as a `Cookie` header value
    async fn saved_cookies(&self) -> Option<String> {
        None
    }

    /// Remember the HTTP client's cookies for a later process. Stores that
    /// live only as long as the client ignore this.
    async fn save_cookies(&self, _cookies: Option<String>) {}
}
