//! Async query views consumed by the renderer.
//!
//! Each view publishes a [`QueryState`] for the key it was last asked about.
//! A response for any older key is dropped on arrival, so a slow response can
//! never overwrite state set by a newer request.

use crate::cache::{FetchResult, QueryCache};
use crate::client::{GitHubClient, RepositorySource};
use crate::config::GitsploreConfig;
use crate::error::ApiError;
use crate::models::{CacheKey, SearchFilters, SearchResultPage};
use crate::query;
use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryState {
    pub key: Option<CacheKey>,
    pub data: Option<Arc<SearchResultPage>>,
    pub is_loading: bool,
    pub error: Option<ApiError>,
}

impl QueryState {
    fn loading(key: CacheKey) -> Self {
        QueryState {
            key: Some(key),
            data: None,
            is_loading: true,
            error: None,
        }
    }

    fn settled(key: CacheKey, result: FetchResult) -> Self {
        let (data, error) = match result {
            Ok(data) => (Some(data), None),
            Err(err) => (None, Some(err)),
        };
        QueryState {
            key: Some(key),
            data,
            is_loading: false,
            error,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.key.is_none()
    }
}

/// What happened to a response when it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    Discarded,
}

struct QueryView {
    tx: watch::Sender<QueryState>,
    generation: Mutex<u64>,
}

impl QueryView {
    fn new() -> Self {
        let (tx, _) = watch::channel(QueryState::default());
        QueryView {
            tx,
            generation: Mutex::new(0),
        }
    }

    /// Make `state` current and return its generation.
    fn replace(&self, state: QueryState) -> u64 {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.tx.send_replace(state);
        *generation
    }

    fn deliver(&self, generation: u64, state: QueryState) -> Delivery {
        let current = self.generation.lock();
        if *current != generation {
            debug!(key = ?state.key, "discarding stale response");
            return Delivery::Discarded;
        }
        self.tx.send_replace(state);
        Delivery::Applied
    }
}

pub struct Explorer {
    source: Arc<dyn RepositorySource>,
    cache: QueryCache,
    per_page: u32,
    search: Arc<QueryView>,
    trending: Arc<QueryView>,
}

impl Explorer {
    pub fn new(source: Arc<dyn RepositorySource>, cache: QueryCache, per_page: u32) -> Self {
        Explorer {
            source,
            cache,
            per_page,
            search: Arc::new(QueryView::new()),
            trending: Arc::new(QueryView::new()),
        }
    }

    pub fn from_config(config: &GitsploreConfig) -> Result<Self, ApiError> {
        let client = GitHubClient::new(config)?;
        let cache = QueryCache::new(config.cache_policy(), config.retry_policy());
        Ok(Explorer::new(Arc::new(client), cache, config.per_page))
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn search_state(&self) -> QueryState {
        self.search.tx.borrow().clone()
    }

    pub fn subscribe_search(&self) -> watch::Receiver<QueryState> {
        self.search.tx.subscribe()
    }

    pub fn trending_state(&self) -> QueryState {
        self.trending.tx.borrow().clone()
    }

    pub fn subscribe_trending(&self) -> watch::Receiver<QueryState> {
        self.trending.tx.subscribe()
    }

    /// Point the search view at `term` + `filters`.
    ///
    /// Returns `None` when the view settled immediately: a blank term leaves it
    /// idle, a fresh cache entry is shown as is. Otherwise the returned task
    /// reports whether its response was applied or discarded as stale.
    pub fn search_repositories(
        &self,
        term: &str,
        filters: &SearchFilters,
    ) -> Option<JoinHandle<Delivery>> {
        if term.is_empty() {
            self.search.replace(QueryState::default());
            return None;
        }
        let key = CacheKey::search(term, filters.clone());
        self.request(&self.search, key)
    }

    /// Point the trending view at `language` (`None` or empty for all).
    pub fn get_trending_repositories(&self, language: Option<&str>) -> Option<JoinHandle<Delivery>> {
        self.request(&self.trending, CacheKey::trending(language))
    }

    /// One-off search outside any view, still cached and retried.
    pub async fn fetch_search(&self, term: &str, filters: &SearchFilters, page: u32) -> FetchResult {
        let key = CacheKey::search_page(term, filters.clone(), page);
        self.fetch(key).await
    }

    pub async fn fetch_trending(&self, language: Option<&str>) -> FetchResult {
        self.fetch(CacheKey::trending(language)).await
    }

    fn request(&self, view: &Arc<QueryView>, key: CacheKey) -> Option<JoinHandle<Delivery>> {
        if let Some(data) = self.cache.fresh(&key) {
            view.replace(QueryState::settled(key, Ok(data)));
            return None;
        }

        let generation = view.replace(QueryState::loading(key.clone()));
        let view = Arc::clone(view);
        let cache = self.cache.clone();
        let fetcher = self.fetcher(&key);
        Some(tokio::spawn(async move {
            let result = cache.get(key.clone(), fetcher).await;
            view.deliver(generation, QueryState::settled(key, result))
        }))
    }

    async fn fetch(&self, key: CacheKey) -> FetchResult {
        let fetcher = self.fetcher(&key);
        self.cache.get(key, fetcher).await
    }

    fn fetcher(
        &self,
        key: &CacheKey,
    ) -> impl Fn() -> BoxFuture<'static, Result<SearchResultPage, ApiError>> + Send + Sync + 'static
    {
        let source = Arc::clone(&self.source);
        let per_page = self.per_page;
        let key = key.clone();
        move || {
            let source = Arc::clone(&source);
            let key = key.clone();
            async move {
                match key {
                    CacheKey::Search {
                        term,
                        filters,
                        page,
                    } => {
                        let q = query::build_query(&term, &filters);
                        source
                            .search(&q, filters.sort, filters.order, page, per_page)
                            .await
                    }
                    CacheKey::Trending { language } => source.trending(language.as_deref()).await,
                }
            }
            .boxed()
        }
    }
}
