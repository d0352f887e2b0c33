//! Keyed result cache with per-family staleness windows, request coalescing
//! and flat retry.
//!
//! At most one fetch is in flight per key: concurrent callers share the same
//! attempt sequence. Failures are never cached past the request that produced
//! them.

use crate::error::ApiError;
use crate::models::{CacheKey, KeyFamily, SearchResultPage};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

pub type FetchResult = Result<Arc<SearchResultPage>, ApiError>;

type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub search_stale: Duration,
    pub trending_stale: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy {
            search_stale: Duration::from_secs(5 * 60),
            trending_stale: Duration::from_secs(30 * 60),
        }
    }
}

impl CachePolicy {
    pub fn stale_after(&self, family: KeyFamily) -> Duration {
        match family {
            KeyFamily::Search => self.search_stale,
            KeyFamily::Trending => self.trending_stale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 2,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, label: &str, op: F) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                warn!(
                    key = label,
                    attempt,
                    attempts,
                    kind = %err.kind(),
                    error = %err,
                    "fetch failed, retrying"
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt += 1;
            }
            Err(err) => {
                error!(key = label, attempts, kind = %err.kind(), error = %err, "fetch failed");
                return Err(err);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Success,
    Error,
}

enum Entry {
    Pending { id: u64, fetch: SharedFetch },
    Success { data: Arc<SearchResultPage>, fetched_at: Instant },
    Error { error: ApiError },
}

struct Inner {
    entries: Mutex<HashMap<CacheKey, Entry>>,
    next_id: AtomicU64,
}

impl Inner {
    /// Record the outcome of fetch `id`, unless the entry was dropped or
    /// replaced while it was running.
    fn settle(&self, key: &CacheKey, id: u64, result: &FetchResult) {
        let mut entries = self.entries.lock();
        let current = matches!(entries.get(key), Some(Entry::Pending { id: pending, .. }) if *pending == id);
        if !current {
            debug!(%key, "fetch finished for a dropped entry");
            return;
        }
        let entry = match result {
            Ok(data) => Entry::Success {
                data: Arc::clone(data),
                fetched_at: Instant::now(),
            },
            Err(error) => Entry::Error {
                error: error.clone(),
            },
        };
        entries.insert(key.clone(), entry);
    }
}

/// Request-scoped cache of search result pages.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
    policy: CachePolicy,
    retry: RetryPolicy,
}

impl Default for QueryCache {
    fn default() -> Self {
        QueryCache::new(CachePolicy::default(), RetryPolicy::default())
    }
}

impl QueryCache {
    pub fn new(policy: CachePolicy, retry: RetryPolicy) -> Self {
        QueryCache {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
            policy,
            retry,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Cached page for `key` if it is still inside its staleness window.
    pub fn fresh(&self, key: &CacheKey) -> Option<Arc<SearchResultPage>> {
        let window = self.policy.stale_after(key.family());
        match self.inner.entries.lock().get(key) {
            Some(Entry::Success { data, fetched_at }) if fetched_at.elapsed() < window => {
                Some(Arc::clone(data))
            }
            _ => None,
        }
    }

    /// Fresh cached page, the in-flight fetch for `key`, or a new fetch.
    pub async fn get<F, Fut>(&self, key: CacheKey, fetcher: F) -> FetchResult
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SearchResultPage, ApiError>> + Send + 'static,
    {
        let window = self.policy.stale_after(key.family());
        let fetch = {
            let mut entries = self.inner.entries.lock();
            match entries.get(&key) {
                Some(Entry::Success { data, fetched_at }) if fetched_at.elapsed() < window => {
                    debug!(%key, "cache hit");
                    return Ok(Arc::clone(data));
                }
                Some(Entry::Pending { fetch, .. }) => {
                    debug!(%key, "joining in-flight fetch");
                    fetch.clone()
                }
                _ => {
                    debug!(%key, "cache miss");
                    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                    let fetch = self.start_fetch(key.clone(), id, fetcher);
                    entries.insert(
                        key,
                        Entry::Pending {
                            id,
                            fetch: fetch.clone(),
                        },
                    );
                    fetch
                }
            }
        };
        fetch.await
    }

    fn start_fetch<F, Fut>(&self, key: CacheKey, id: u64, fetcher: F) -> SharedFetch
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SearchResultPage, ApiError>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let retry = self.retry;
        async move {
            let label = key.to_string();
            let result = with_retry(retry, &label, &fetcher).await.map(Arc::new);
            inner.settle(&key, id, &result);
            result
        }
        .boxed()
        .shared()
    }

    pub fn status(&self, key: &CacheKey) -> Option<EntryStatus> {
        self.inner.entries.lock().get(key).map(|entry| match entry {
            Entry::Pending { .. } => EntryStatus::Pending,
            Entry::Success { .. } => EntryStatus::Success,
            Entry::Error { .. } => EntryStatus::Error,
        })
    }

    /// Error recorded by the last failed fetch for `key`.
    pub fn last_error(&self, key: &CacheKey) -> Option<ApiError> {
        match self.inner.entries.lock().get(key) {
            Some(Entry::Error { error }) => Some(error.clone()),
            _ => None,
        }
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.inner.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.inner.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchFilters;
    use std::sync::atomic::AtomicUsize;

    fn page(total_count: u64) -> SearchResultPage {
        SearchResultPage {
            total_count,
            incomplete_results: false,
            items: vec![],
        }
    }

    fn key(term: &str) -> CacheKey {
        CacheKey::search(term, SearchFilters::default())
    }

    fn counting_fetcher(
        calls: &Arc<AtomicUsize>,
    ) -> impl Fn() -> BoxFuture<'static, Result<SearchResultPage, ApiError>> + Send + Sync + 'static
    {
        let calls = Arc::clone(calls);
        move || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(page(n as u64))
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_fetch() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.get(key("rust"), counting_fetcher(&calls)),
            cache.get(key("rust"), counting_fetcher(&calls)),
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.status(&key("rust")), Some(EntryStatus::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn different_keys_fetch_independently() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.get(key("a"), counting_fetcher(&calls)),
            cache.get(key("b"), counting_fetcher(&calls)),
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn search_entries_go_stale_after_five_minutes() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get(key("rust"), counting_fetcher(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(4 * 60)).await;
        let cached = cache.get(key("rust"), counting_fetcher(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.total_count, 1);

        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        assert!(cache.fresh(&key("rust")).is_none());
        let refetched = cache.get(key("rust"), counting_fetcher(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refetched.total_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn trending_entries_use_thirty_minute_window() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let trending = CacheKey::trending(Some("Go"));

        cache.get(trending.clone(), counting_fetcher(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(29 * 60)).await;
        cache.get(trending.clone(), counting_fetcher(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        cache.get(trending, counting_fetcher(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt() {
        let cache = QueryCache::default();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let result = cache
            .get(key("flaky"), move || {
                let counter = Arc::clone(&counter);
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 {
                        Err(ApiError::Request { status: 502 })
                    } else {
                        Ok(page(7))
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap().total_count, 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = QueryCache::default();
        let attempts = Arc::new(AtomicUsize::new(0));

        for round in 1..=2 {
            let counter = Arc::clone(&attempts);
            let result = cache
                .get(key("down"), move || {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err::<SearchResultPage, _>(ApiError::Network("connection refused".into()))
                    }
                })
                .await;

            assert_eq!(
                result.unwrap_err(),
                ApiError::Network("connection refused".into())
            );
            assert_eq!(attempts.load(Ordering::SeqCst), 3 * round);
            assert_eq!(cache.status(&key("down")), Some(EntryStatus::Error));
            assert!(cache.last_error(&key("down")).is_some());
        }
    }

    #[test]
    fn attempts_saturate_at_max_retries() {
        let policy = RetryPolicy {
            max_retries: u32::MAX,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.attempts(), u32::MAX);
        assert_eq!(RetryPolicy::default().attempts(), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_one_attempt() {
        let policy = RetryPolicy {
            max_retries: 0,
            delay: Duration::ZERO,
        };
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result: Result<(), ApiError> = with_retry(policy, "once", move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Parse("bad".into()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_refetch() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get(key("rust"), counting_fetcher(&calls)).await.unwrap();
        cache.invalidate(&key("rust"));
        assert_eq!(cache.status(&key("rust")), None);

        cache.get(key("rust"), counting_fetcher(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
