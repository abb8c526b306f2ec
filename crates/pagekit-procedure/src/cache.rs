//! Single-flight query cache using moka
//!
//! Stores one shared future per `(id, url)`. Every reference to the same key
//! while the future is pending or settled gets a clone of it, so the network
//! call is issued once. Invalidation bumps a generation counter that is part
//! of the key, so a response still in flight from before the invalidation is
//! never served afterwards.

use crate::error::ProcedureError;
use futures::future::{BoxFuture, FutureExt, Shared};
use moka::future::Cache;
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Outcome of a query
pub type QueryResult = Result<Arc<Value>, Arc<ProcedureError>>;

/// Query future shared between every reference to one key
pub type SharedQuery = Shared<BoxFuture<'static, QueryResult>>;

/// Identity of a query for caching and deduplication
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub id: String,
    /// Fully resolved URL
    pub url: String,
}

impl QueryKey {
    /// Create query key
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// Observable state of a cached query
#[derive(Debug, Clone)]
pub enum QueryState {
    /// Network call in flight or not yet driven
    Pending,
    /// Parsed response body
    Settled(Arc<Value>),
    /// Terminal failure
    Failed(Arc<ProcedureError>),
}

impl QueryState {
    /// State of a shared query future
    #[must_use]
    pub fn of(query: &SharedQuery) -> Self {
        match query.peek() {
            None => Self::Pending,
            Some(Ok(value)) => Self::Settled(Arc::clone(value)),
            Some(Err(err)) => Self::Failed(Arc::clone(err)),
        }
    }

    /// Check if the query reached a terminal state
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Session-scoped query cache
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<(u64, QueryKey), SharedQuery>,
    generation: Arc<AtomicU64>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("generation", &self.generation())
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl QueryCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current invalidation generation
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Shared future for `key`, installing `fetch` on a miss
    ///
    /// `fetch` is dropped unpolled when the key is already cached.
    pub async fn get_or_insert(&self, key: QueryKey, fetch: BoxFuture<'static, QueryResult>) -> SharedQuery {
        let cache_key = (self.generation(), key);
        if self.inner.contains_key(&cache_key) {
            tracing::debug!(query = %cache_key.1, "query cache hit");
        } else {
            tracing::debug!(query = %cache_key.1, "query cache miss");
        }
        self.inner.get_with(cache_key, async move { fetch.shared() }).await
    }

    /// Cached future for `key` in the current generation
    pub async fn get(&self, key: &QueryKey) -> Option<SharedQuery> {
        self.inner.get(&(self.generation(), key.clone())).await
    }

    /// State of `key` in the current generation, `None` if never requested
    pub async fn state(&self, key: &QueryKey) -> Option<QueryState> {
        self.get(key).await.map(|query| QueryState::of(&query))
    }

    /// Drop every entry and start a new generation
    pub fn invalidate_all(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.invalidate_all();
        tracing::debug!(generation, "query cache invalidated");
    }

    /// Drop entries that settled as failures
    ///
    /// Called when a page is remounted so failed queries become retryable.
    pub async fn evict_failed(&self) {
        let failed: Vec<_> = self
            .inner
            .iter()
            .filter(|(_, query)| matches!(query.peek(), Some(Err(_))))
            .map(|(key, _)| key)
            .collect();
        for key in failed {
            tracing::debug!(query = %key.1, "evicting failed query");
            self.inner.invalidate(key.as_ref()).await;
        }
    }

    /// Drop `key` if its query has not settled
    ///
    /// Returns `true` if an entry was removed. Settled results stay cached.
    pub async fn evict_pending(&self, key: &QueryKey) -> bool {
        let cache_key = (self.generation(), key.clone());
        match self.inner.get(&cache_key).await {
            Some(query) if query.peek().is_none() => {
                tracing::debug!(query = %key, "evicting pending query");
                self.inner.invalidate(&cache_key).await;
                true
            }
            _ => false,
        }
    }

    /// Get approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Apply pending maintenance so counts are exact
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for QueryCache {
    /// Create cache with default capacity (1,000 entries)
    fn default() -> Self {
        Self::new(1_000)
    }
}
