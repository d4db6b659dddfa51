//! Wiring shared by every command: config, session store, client, cache.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::notifier::TerminalNotifier;
use crate::domain::models::Config;
use crate::infrastructure::api::{ApiClient, ApiClientConfig};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::session::FileSessionStore;
use crate::services::QueryCache;

const DEFAULT_SESSION_FILE: &str = ".tablefetch/session.json";

/// Load configuration from `path` or the default hierarchy.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

pub struct CliContext {
    pub config: Config,
    pub client: Arc<ApiClient>,
    pub cache: Arc<QueryCache>,
}

impl CliContext {
    pub async fn new(config: Config) -> Result<Self> {
        let session_path = config
            .api
            .session_file
            .as_ref()
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);
        let store = FileSessionStore::open(&session_path).await;

        let client = ApiClient::new(
            ApiClientConfig::from(&config.api),
            Arc::new(store),
            Arc::new(TerminalNotifier),
        )
        .context("Failed to build HTTP client")?;
        client.restore_saved_cookies().await;

        let cache = QueryCache::new(Duration::from_millis(config.pagination.stale_time_ms));

        Ok(Self {
            config,
            client: Arc::new(client),
            cache: Arc::new(cache),
        })
    }
}
