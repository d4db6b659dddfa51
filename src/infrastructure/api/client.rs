use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client as ReqwestClient, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::errors::{backend_message, ApiError};
use super::request::{ApiRequest, ApiResponse};
use crate::domain::models::{ApiConfig, Session, TokenResponse};
use crate::domain::ports::{SessionNotifier, SessionStore};

/// Configuration for the admin API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the backend
    pub base_url: String,

    /// Cookie-credentialed refresh endpoint
    pub refresh_path: String,

    pub login_path: String,

    pub logout_path: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            refresh_path: api.refresh_path.clone(),
            login_path: api.login_path.clone(),
            logout_path: api.logout_path.clone(),
            timeout_secs: api.timeout_secs,
        }
    }
}

/// HTTP client for the admin backend
///
/// Every request carries `Authorization: Bearer <token>` when the session
/// holds one. A 401 triggers exactly one refresh-and-retry:
/// - concurrent 401s share a single refresh call
/// - a failed refresh for a session that had a token clears the session and
///   emits one "session expired" notification
/// - every other error is returned unchanged
pub struct ApiClient {
    http_client: ReqwestClient,
    base_url: String,
    pub(super) refresh_path: String,
    pub(super) login_path: String,
    pub(super) logout_path: String,
    pub(super) session: Arc<dyn SessionStore>,
    notifier: Arc<dyn SessionNotifier>,
    refresh_lock: Mutex<()>,
    cookies: Arc<Jar>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Example
    /// ```no_run
    /// use std::sync::Arc;
    /// use tablefetch::domain::ports::LogNotifier;
    /// use tablefetch::infrastructure::api::{ApiClient, ApiClientConfig};
    /// use tablefetch::infrastructure::session::InMemorySessionStore;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new(
    ///     ApiClientConfig::default(),
    ///     Arc::new(InMemorySessionStore::new()),
    ///     Arc::new(LogNotifier),
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        config: ApiClientConfig,
        session: Arc<dyn SessionStore>,
        notifier: Arc<dyn SessionNotifier>,
    ) -> Result<Self, ApiError> {
        info!(
            "Initializing API client: base_url={}, timeout={}s",
            config.base_url, config.timeout_secs
        );

        // The refresh token lives in an HTTP-only cookie.
        let cookies = Arc::new(Jar::default());
        let http_client = ReqwestClient::builder()
            .cookie_provider(Arc::clone(&cookies))
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            refresh_path: config.refresh_path,
            login_path: config.login_path,
            logout_path: config.logout_path,
            session,
            notifier,
            refresh_lock: Mutex::new(()),
            cookies,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current session
    pub async fn session(&self) -> Session {
        self.session.snapshot().await
    }

    /// Seed the cookie jar with cookies the session store kept from an
    /// earlier process, so the refresh cookie outlives a single run.
    pub async fn restore_saved_cookies(&self) {
        let Some(saved) = self.session.saved_cookies().await else {
            return;
        };
        let url = match self.cookie_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot restore saved cookies");
                return;
            }
        };
        let mut restored = 0;
        for pair in saved.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.cookies.add_cookie_str(pair, &url);
            restored += 1;
        }
        debug!(restored, "restored saved cookies");
    }

    /// Hand the jar's current cookies to the session store.
    pub(super) async fn save_cookies(&self) {
        let url = match self.cookie_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot save cookies");
                return;
            }
        };
        let header = self
            .cookies
            .cookies(&url)
            .and_then(|value| value.to_str().ok().map(str::to_string));
        self.session.save_cookies(header).await;
    }

    /// Cookies are scoped to the refresh endpoint, the only place they are read.
    fn cookie_url(&self) -> Result<Url, ApiError> {
        Url::parse(&self.url(&self.refresh_path))
            .map_err(|e| ApiError::InvalidRequest(format!("bad refresh URL: {e}")))
    }

    /// Send a request, recovering once from a 401
    ///
    /// Resolves to `ApiError::Cancelled` as soon as the request's
    /// cancellation token fires; the in-flight transport call is dropped.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let Some(cancel) = request.cancel.clone() else {
            return self.send_authenticated(&request).await;
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("request cancelled");
                Err(ApiError::Cancelled)
            }
            result = self.send_authenticated(&request) => result,
        }
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<T, ApiError> {
        let mut request = ApiRequest::get(path);
        request.cancel = cancel;
        self.send(request).await?.json()
    }

    async fn send_authenticated(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let seen = self.session.snapshot().await;
        let response = self.dispatch(request, seen.access_token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::read_response(response).await;
        }

        let body = response.text().await.unwrap_or_default();
        debug!(generation = seen.generation, "received 401, recovering session");

        let token = self.recover_session(&seen, &body).await?;
        let retried = self.dispatch(request, Some(&token)).await?;

        // A second 401 is final.
        Self::read_response(retried).await
    }

    /// Obtain a usable token after a 401 seen with session `seen`.
    ///
    /// Serialized by `refresh_lock`: a waiter that finds the session already
    /// rewritten reuses the outcome instead of refreshing again.
    async fn recover_session(&self, seen: &Session, body: &str) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.session.snapshot().await;
        if current.generation != seen.generation {
            return match current.access_token {
                Some(token) => {
                    debug!("session already refreshed by a concurrent request");
                    Ok(token)
                }
                None if seen.is_authenticated() => Err(ApiError::SessionExpired),
                None => Err(ApiError::Unauthorized(backend_message(body))),
            };
        }

        match self.refresh_access_token().await {
            Ok(token) => {
                self.session.replace_token(token.clone()).await;
                self.save_cookies().await;
                info!("access token refreshed");
                Ok(token)
            }
            Err(err) => {
                warn!(error = %err, had_token = seen.is_authenticated(), "token refresh failed");
                if seen.is_authenticated() {
                    self.session.clear().await;
                    self.notifier.session_expired();
                    Err(ApiError::SessionExpired)
                } else {
                    Err(ApiError::Unauthorized(backend_message(body)))
                }
            }
        }
    }

    /// POST the refresh endpoint with cookies only, no bearer token.
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let request = ApiRequest::post(self.refresh_path.clone());
        let response = self.dispatch(&request, None).await?;
        let token: TokenResponse = Self::read_response(response).await?.json()?;
        Ok(token.access_token)
    }

    pub(super) async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = self.url(&request.path);
        debug!(method = %request.method, %url, authenticated = token.is_some(), "dispatching request");

        let mut builder = self
            .http_client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    pub(super) async fn read_response(response: Response) -> Result<ApiResponse, ApiError> {
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            warn!("API error ({}): {}", status, body);
            return Err(ApiError::from_status(status, &body));
        }

        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse { status, body })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }
}
