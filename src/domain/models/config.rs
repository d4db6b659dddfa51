use serde::{Deserialize, Serialize};

/// Main configuration structure for tablefetch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Collection controller defaults
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Base URL every request path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL for uploaded assets (avatars, attachments)
    #[serde(default = "default_storage_base_url")]
    pub storage_base_url: String,

    /// Cookie-credentialed endpoint that mints a new access token
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_logout_path")]
    pub logout_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Where the CLI persists the session between invocations
    #[serde(default)]
    pub session_file: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_storage_base_url() -> String {
    "http://localhost:8000/storage".to_string()
}

fn default_refresh_path() -> String {
    "/api/auth/refresh-token".to_string()
}

fn default_login_path() -> String {
    "/api/auth/login".to_string()
}

fn default_logout_path() -> String {
    "/api/auth/logout".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            storage_base_url: default_storage_base_url(),
            refresh_path: default_refresh_path(),
            login_path: default_login_path(),
            logout_path: default_logout_path(),
            timeout_secs: default_timeout_secs(),
            session_file: None,
        }
    }
}

impl ApiConfig {
    /// Resolve a storage-relative asset path against `storage_base_url`.
    ///
    /// Absolute URLs are returned untouched.
    pub fn storage_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.storage_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Defaults applied to every collection controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaginationConfig {
    /// Initial page size, one of "10", "18", "24", "30"
    #[serde(default = "default_page_size")]
    pub default_page_size: String,

    /// Quiet period before a search term is committed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long a cached page is served without going to the network
    #[serde(default)]
    pub stale_time_ms: u64,

    /// Reset to page 1 whenever size, sort, search or filter change
    #[serde(default)]
    pub reset_page_on_change: bool,
}

fn default_page_size() -> String {
    "10".to_string()
}

const fn default_debounce_ms() -> u64 {
    200
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            stale_time_ms: 0,
            reset_page_on_change: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
