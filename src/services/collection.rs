//! Pagination/filter controller for one collection endpoint.
//!
//! The controller owns the table state (page, size, sort, search, extra
//! filter) and turns it into a `CacheKey`. Fetching is an explicit state
//! machine:
//!
//! ```text
//!   Idle ──fetch──▶ Fetching ──ok──▶ Settled
//!                     │   ▲  └─err─▶ Errored
//!                     └───┘ newer fetch cancels the older one
//! ```
//!
//! Only the most recently issued fetch may touch visible state. The last
//! successful page stays visible while a newer fetch runs and after a fetch
//! fails.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::debounce::Debouncer;
use super::query_cache::{FetchMode, QueryCache};
use crate::domain::models::{
    CacheKey, FetchResult, FilterSet, PageSize, PaginationConfig, PaginationState, SortKey,
};
use crate::infrastructure::api::{ApiClient, ApiError, ApiRequest};

/// Where the controller is in its fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Fetching,
    Settled,
    Errored,
}

/// What happened to a fetch call
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// The result is now the visible page
    Applied(Arc<FetchResult<T>>),
    /// A newer fetch started (or the fetch was cancelled); nothing changed
    Superseded,
}

impl<T> FetchOutcome<T> {
    pub fn applied(self) -> Option<Arc<FetchResult<T>>> {
        match self {
            Self::Applied(result) => Some(result),
            Self::Superseded => None,
        }
    }
}

/// Controller construction options
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Quiet period before a search term is committed
    pub debounce: Duration,
    /// Reset page to 1 when size, sort, search or filter change
    pub reset_page_on_change: bool,
    pub initial: PaginationState,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            reset_page_on_change: false,
            initial: PaginationState::default(),
        }
    }
}

impl From<&PaginationConfig> for ControllerOptions {
    fn from(config: &PaginationConfig) -> Self {
        let page_size = config.default_page_size.parse().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default page size");
            PageSize::default()
        });
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            reset_page_on_change: config.reset_page_on_change,
            initial: PaginationState {
                page_size,
                ..PaginationState::default()
            },
        }
    }
}

struct ControllerState<T> {
    pagination: PaginationState,
    /// Raw search input still inside the debounce window
    pending_search: Option<String>,
    status: FetchStatus,
    data: Option<Arc<FetchResult<T>>>,
    last_error: Option<Arc<ApiError>>,
    /// Bumped for every issued fetch; only the matching fetch may apply
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl<T> ControllerState<T> {
    const fn resting_status(&self) -> FetchStatus {
        if self.last_error.is_some() {
            FetchStatus::Errored
        } else if self.data.is_some() {
            FetchStatus::Settled
        } else {
            FetchStatus::Idle
        }
    }
}

struct Inner<T> {
    endpoint: String,
    client: Arc<ApiClient>,
    cache: Arc<QueryCache>,
    debounce: Duration,
    reset_page_on_change: bool,
    state: Mutex<ControllerState<T>>,
    keys: watch::Sender<CacheKey>,
    search: OnceLock<Debouncer<String>>,
    this: Weak<Inner<T>>,
}

impl<T> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, ControllerState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a state change and publish the new key if it differs.
    fn update<F>(&self, resets_page: bool, change: F)
    where
        F: FnOnce(&mut PaginationState),
    {
        let key = {
            let mut state = self.lock();
            let before = state.pagination.clone();
            change(&mut state.pagination);
            if resets_page && self.reset_page_on_change && state.pagination != before {
                state.pagination.page = 1;
            }
            state.pagination.cache_key(&self.endpoint)
        };

        self.keys.send_if_modified(|current| {
            if *current == key {
                false
            } else {
                debug!(%key, "cache key changed");
                *current = key;
                true
            }
        });
    }

    fn commit_search(&self, term: String) {
        {
            let mut state = self.lock();
            if state.pending_search.as_deref() == Some(term.as_str()) {
                state.pending_search = None;
            }
        }
        self.update(true, |p| p.search_term = term);
    }
}

/// Handle to a collection controller; clones share state.
pub struct CollectionController<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for CollectionController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> CollectionController<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(
        client: Arc<ApiClient>,
        cache: Arc<QueryCache>,
        endpoint: impl Into<String>,
        options: ControllerOptions,
    ) -> Self {
        let endpoint = endpoint.into();
        let key = options.initial.cache_key(&endpoint);
        let (keys, _) = watch::channel(key);

        let inner = Arc::new_cyclic(|this| Inner {
            endpoint,
            client,
            cache,
            debounce: options.debounce,
            reset_page_on_change: options.reset_page_on_change,
            state: Mutex::new(ControllerState {
                pagination: options.initial,
                pending_search: None,
                status: FetchStatus::Idle,
                data: None,
                last_error: None,
                generation: 0,
                in_flight: None,
            }),
            keys,
            search: OnceLock::new(),
            this: this.clone(),
        });

        Self { inner }
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn set_page(&self, page: u32) {
        self.inner.update(false, |p| p.page = page.max(1));
    }

    pub fn set_page_size(&self, page_size: PageSize) {
        self.inner.update(true, |p| p.page_size = page_size);
    }

    /// Column names are not validated.
    pub fn set_sort_key(&self, sort_key: impl Into<SortKey>) {
        let sort_key = String::from(sort_key.into());
        self.inner.update(true, |p| p.sort_key = sort_key);
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::from(self.inner.lock().pagination.sort_key.as_str())
    }

    /// Debounced: the term joins the cache key once input has been quiet for
    /// the configured period. Must be called inside a Tokio runtime.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.inner.lock().pending_search = Some(term.clone());

        let debouncer = self.inner.search.get_or_init(|| {
            let this = self.inner.this.clone();
            Debouncer::spawn(self.inner.debounce, move |term: String| {
                if let Some(inner) = this.upgrade() {
                    inner.commit_search(term);
                }
            })
        });
        debouncer.push(term);
    }

    /// Commit a search term immediately, skipping the debounce window.
    pub fn commit_search_term(&self, term: impl Into<String>) {
        self.inner.commit_search(term.into());
    }

    /// Pre-encoded query fragment appended verbatim to the request.
    pub fn set_extra_filter(&self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        self.inner.update(true, |p| p.extra_filter = fragment);
    }

    pub fn set_filters(&self, filters: &FilterSet) {
        self.set_extra_filter(filters.encode());
    }

    pub fn state(&self) -> PaginationState {
        self.inner.lock().pagination.clone()
    }

    /// Search input not yet committed by the debouncer.
    pub fn pending_search(&self) -> Option<String> {
        self.inner.lock().pending_search.clone()
    }

    pub fn cache_key(&self) -> CacheKey {
        self.inner.lock().pagination.cache_key(&self.inner.endpoint)
    }

    pub fn request_path(&self) -> String {
        self.cache_key().request_path()
    }

    pub fn status(&self) -> FetchStatus {
        self.inner.lock().status
    }

    /// Last successful page; kept while fetching and after errors.
    pub fn data(&self) -> Option<Arc<FetchResult<T>>> {
        self.inner.lock().data.clone()
    }

    pub fn last_error(&self) -> Option<Arc<ApiError>> {
        self.inner.lock().last_error.clone()
    }

    /// Receives every cache key change.
    pub fn subscribe(&self) -> watch::Receiver<CacheKey> {
        self.inner.keys.subscribe()
    }

    /// Fetch the current key, reusing a fresh cached page.
    pub async fn fetch(&self) -> Result<FetchOutcome<T>, Arc<ApiError>> {
        self.run(FetchMode::IfStale).await
    }

    /// Fetch the current key from the network, e.g. after a mutation.
    pub async fn refetch(&self) -> Result<FetchOutcome<T>, Arc<ApiError>> {
        self.run(FetchMode::Force).await
    }

    /// Drop cached pages for this endpoint.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate(&self.inner.endpoint).await;
    }

    /// Abort the in-flight fetch, if any.
    pub fn cancel(&self) {
        let mut state = self.inner.lock();
        if let Some(token) = state.in_flight.take() {
            token.cancel();
            state.generation += 1;
            state.status = state.resting_status();
        }
    }

    /// Fetch on every key change until the controller is dropped.
    ///
    /// Fetches once immediately. Each change cancels the previous fetch.
    pub fn spawn_auto_fetch(&self) -> JoinHandle<()> {
        let this = Arc::downgrade(&self.inner);
        let mut keys = self.subscribe();

        tokio::spawn(async move {
            loop {
                let Some(inner) = this.upgrade() else { break };
                let controller = Self { inner };
                tokio::spawn(async move {
                    if let Err(err) = controller.fetch().await {
                        warn!(endpoint = controller.endpoint(), error = %err, "auto fetch failed");
                    }
                });

                if keys.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    async fn run(&self, mode: FetchMode) -> Result<FetchOutcome<T>, Arc<ApiError>> {
        let (key, generation, cancel) = {
            let mut state = self.inner.lock();
            if let Some(previous) = state.in_flight.take() {
                previous.cancel();
            }
            state.generation += 1;
            let cancel = CancellationToken::new();
            state.in_flight = Some(cancel.clone());
            state.status = FetchStatus::Fetching;
            (
                state.pagination.cache_key(&self.inner.endpoint),
                state.generation,
                cancel,
            )
        };
        debug!(%key, generation, ?mode, "fetch issued");

        let client = &self.inner.client;
        let path = key.request_path();
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.inner.cache.get_or_fetch(&key, mode, || {
                let request = ApiRequest::get(path).with_cancellation(cancel.clone());
                async move { client.send(request).await?.json::<serde_json::Value>() }
            }) => result,
        };
        let parsed = fetched.and_then(|value| {
            FetchResult::<T>::deserialize(&*value).map_err(ApiError::from)
        });

        let mut state = self.inner.lock();
        if state.generation != generation {
            debug!(generation, latest = state.generation, "discarding superseded fetch");
            return Ok(FetchOutcome::Superseded);
        }
        state.in_flight = None;

        match parsed {
            Ok(result) => {
                let result = Arc::new(result);
                debug!(
                    records = result.records.len(),
                    total = result.info.total,
                    "page applied"
                );
                state.data = Some(Arc::clone(&result));
                state.last_error = None;
                state.status = FetchStatus::Settled;
                Ok(FetchOutcome::Applied(result))
            }
            Err(err) if err.is_cancelled() => {
                state.status = state.resting_status();
                Ok(FetchOutcome::Superseded)
            }
            Err(err) => {
                warn!(%key, error = %err, "fetch failed");
                let err = Arc::new(err);
                state.last_error = Some(Arc::clone(&err));
                state.status = FetchStatus::Errored;
                Err(err)
            }
        }
    }
}
