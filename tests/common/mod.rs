//! Common test utilities for integration tests
//!
//! Shared fixtures for building a client against a wiremock server.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tablefetch::domain::ports::SessionNotifier;
use tablefetch::infrastructure::api::{ApiClient, ApiClientConfig};
use tablefetch::infrastructure::session::{FileSessionStore, InMemorySessionStore};

/// Notifier that counts "session expired" notifications
#[derive(Debug, Default)]
pub struct CountingNotifier {
    expired: AtomicUsize,
}

impl CountingNotifier {
    pub fn count(&self) -> usize {
        self.expired.load(Ordering::SeqCst)
    }
}

impl SessionNotifier for CountingNotifier {
    fn session_expired(&self) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }
}

/// Client wired to `base_url` plus handles to its store and notifier
pub struct TestClient {
    pub client: Arc<ApiClient>,
    pub store: Arc<InMemorySessionStore>,
    pub notifier: Arc<CountingNotifier>,
}

pub fn test_client(base_url: &str, token: Option<&str>) -> TestClient {
    let store = Arc::new(match token {
        Some(token) => InMemorySessionStore::with_token(token),
        None => InMemorySessionStore::new(),
    });
    let notifier = Arc::new(CountingNotifier::default());

    let client = ApiClient::new(
        ApiClientConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..ApiClientConfig::default()
        },
        store.clone(),
        notifier.clone(),
    )
    .expect("Failed to build client");

    TestClient {
        client: Arc::new(client),
        store,
        notifier,
    }
}

/// Client backed by a session file at `session_path`, with saved cookies
/// restored the way the CLI does on startup
pub async fn file_backed_client(
    base_url: &str,
    session_path: &std::path::Path,
) -> (Arc<ApiClient>, Arc<FileSessionStore>) {
    let store = Arc::new(FileSessionStore::open(session_path).await);
    let client = ApiClient::new(
        ApiClientConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..ApiClientConfig::default()
        },
        store.clone(),
        Arc::new(CountingNotifier::default()),
    )
    .expect("Failed to build client");
    client.restore_saved_cookies().await;
    (Arc::new(client), store)
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Wait for a condition to be true with timeout
pub async fn wait_for<F>(mut condition: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
