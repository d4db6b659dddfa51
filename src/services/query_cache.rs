//! Shared cache of collection payloads keyed by `CacheKey`.
//!
//! Payloads are stored as raw JSON so one cache can serve controllers of
//! different record types. Each key owns a slot guarded by an async mutex:
//! concurrent requests for the same key queue on the slot and the later ones
//! reuse whatever the first one fetched.
//!
//! Slots nobody is waiting on are pruned once their payload is stale, so a
//! zero stale time keeps payloads only long enough to serve coalesced waiters.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::models::CacheKey;
use crate::infrastructure::api::ApiError;

/// Whether a cached entry may short-circuit the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Reuse an entry younger than the stale time
    IfStale,
    /// Always fetch, unless a fetch for the key started after this one was
    /// requested
    Force,
}

#[derive(Debug)]
struct CachedEntry {
    value: Arc<Value>,
    started_at: Instant,
    fetched_at: Instant,
}

impl CachedEntry {
    /// Whether this entry can answer a request made at `requested_at`
    /// without going to the network.
    fn serves(&self, mode: FetchMode, requested_at: Instant, stale_time: Duration) -> bool {
        match mode {
            FetchMode::IfStale => {
                self.fetched_at >= requested_at || self.fetched_at.elapsed() < stale_time
            }
            FetchMode::Force => self.started_at >= requested_at,
        }
    }
}

type Slot = Arc<Mutex<Option<CachedEntry>>>;

#[derive(Debug)]
pub struct QueryCache {
    stale_time: Duration,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub const fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Cached payload for `key` or the result of `fetcher`.
    ///
    /// Errors are returned to this caller only and never cached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &CacheKey,
        mode: FetchMode,
        fetcher: F,
    ) -> Result<Arc<Value>, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>>,
    {
        let requested_at = Instant::now();
        let result = {
            let slot = self.slot(key).await;
            let mut entry = slot.lock().await;

            match entry.as_ref() {
                Some(cached) if cached.serves(mode, requested_at, self.stale_time) => {
                    debug!(%key, ?mode, "serving cached page");
                    Ok(Arc::clone(&cached.value))
                }
                _ => {
                    let started_at = Instant::now();
                    fetcher().await.map(|value| {
                        let value = Arc::new(value);
                        *entry = Some(CachedEntry {
                            value: Arc::clone(&value),
                            started_at,
                            fetched_at: Instant::now(),
                        });
                        value
                    })
                }
            }
        };

        self.prune().await;
        result
    }

    /// Last payload stored for `key`, regardless of age.
    pub async fn peek(&self, key: &CacheKey) -> Option<Arc<Value>> {
        let slot = self.slots.lock().await.get(key).cloned()?;
        let entry = slot.lock().await;
        entry.as_ref().map(|cached| Arc::clone(&cached.value))
    }

    /// Drop every entry for `endpoint`, e.g. after a create/update/delete.
    pub async fn invalidate(&self, endpoint: &str) {
        let mut slots = self.slots.lock().await;
        let before = slots.len();
        slots.retain(|key, _| key.endpoint != endpoint);
        debug!(endpoint, dropped = before - slots.len(), "cache invalidated");
    }

    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    /// Drop slots that are stale and not held by any in-flight request.
    ///
    /// A slot handle is only cloned under the map lock, so a strong count of
    /// one here means no request can reach the slot except through the map.
    async fn prune(&self) {
        let mut slots = self.slots.lock().await;
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry
                    .as_ref()
                    .is_some_and(|cached| cached.fetched_at.elapsed() < self.stale_time),
                Err(_) => true,
            }
        });
        let pruned = before - slots.len();
        if pruned > 0 {
            debug!(pruned, retained = slots.len(), "pruned stale cache slots");
        }
    }

    async fn slot(&self, key: &CacheKey) -> Slot {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}
