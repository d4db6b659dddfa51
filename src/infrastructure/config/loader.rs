use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::PageSize;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base_url: {0}. Must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Invalid storage_base_url: {0}. Must start with http:// or https://")]
    InvalidStorageUrl(String),

    #[error("Invalid {0}: {1}. Must start with /")]
    InvalidEndpointPath(&'static str, String),

    #[error("Invalid timeout_secs: 0. Must be at least 1")]
    InvalidTimeout,

    #[error("Invalid default_page_size: {0}. Must be one of: 10, 18, 24, 30")]
    InvalidPageSize(String),

    #[error("Invalid debounce_ms: 0. Must be at least 1")]
    InvalidDebounce,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .tablefetch/config.yaml (project config)
    /// 3. .tablefetch/local.yaml (local overrides, optional)
    /// 4. Environment variables (TABLEFETCH_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The merged provider chain used by [`ConfigLoader::load`].
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".tablefetch/config.yaml"))
            .merge(Yaml::file(".tablefetch/local.yaml"))
            .merge(Env::prefixed("TABLEFETCH_").split("__"))
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("TABLEFETCH_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let api = &config.api;
        if !is_http_url(&api.base_url) {
            return Err(ConfigError::InvalidBaseUrl(api.base_url.clone()));
        }
        if !is_http_url(&api.storage_base_url) {
            return Err(ConfigError::InvalidStorageUrl(api.storage_base_url.clone()));
        }

        for (name, path) in [
            ("refresh_path", &api.refresh_path),
            ("login_path", &api.login_path),
            ("logout_path", &api.logout_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidEndpointPath(name, path.clone()));
            }
        }

        if api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let pagination = &config.pagination;
        if pagination.default_page_size.parse::<PageSize>().is_err() {
            return Err(ConfigError::InvalidPageSize(
                pagination.default_page_size.clone(),
            ));
        }
        if pagination.debounce_ms == 0 {
            return Err(ConfigError::InvalidDebounce);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
