//! Read-through cached summary repository

use super::{summaries_cache_key, summary_cache_key, CacheService, CacheServiceExt};
use async_trait::async_trait;
use paperboy_core::models::{RangeQuery, Summary, SummaryPage};
use paperboy_core::traits::SummaryRepository;
use paperboy_core::{PaperboyError, PaperboyResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(500);

/// Cached summary repository wrapper
///
/// Point and range reads are served from the cache when possible and filled
/// from the inner repository on a miss. Writes go straight to the inner
/// repository and leave existing entries alone, so a read may return the
/// previous value until its entry expires. Cache failures never reach callers:
/// read errors, timeouts and undecodable entries count as a miss, write
/// errors are logged.
pub struct CachedSummaryRepository {
    /// Inner repository implementation
    inner: Arc<dyn SummaryRepository>,
    /// Cache service
    cache: Arc<dyn CacheService>,
    ttl: Duration,
    /// Upper bound for a single cache operation
    timeout: Duration,
}

impl CachedSummaryRepository {
    pub fn new(inner: Arc<dyn SummaryRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            inner,
            cache,
            ttl: DEFAULT_CACHE_TTL,
            timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn lookup<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let result = match tokio::time::timeout(self.timeout, self.cache.get_typed::<T>(key)).await
        {
            Ok(result) => result,
            Err(_) => Err(PaperboyError::CacheUnavailable(format!(
                "get timed out after {:?}",
                self.timeout
            ))),
        };

        match result {
            Ok(Some(value)) => {
                debug!("Cache hit: {}", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                warn!("Cache read failed for {}, falling back to store: {}", key, e);
                None
            }
        }
    }

    async fn fill<T>(&self, key: &str, value: &T)
    where
        T: Serialize + Send + Sync,
    {
        let result =
            match tokio::time::timeout(self.timeout, self.cache.set_typed(key, value, self.ttl))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(PaperboyError::CacheUnavailable(format!(
                    "set timed out after {:?}",
                    self.timeout
                ))),
            };

        if let Err(e) = result {
            warn!("Cache write failed for {}: {}", key, e);
        }
    }
}

#[async_trait]
impl SummaryRepository for CachedSummaryRepository {
    #[instrument(skip(self, summary), fields(content_id = %summary.info.content_id))]
    async fn create(&self, summary: &Summary) -> PaperboyResult<()> {
        self.inner.create(summary).await
    }

    #[instrument(skip(self))]
    async fn find_by_key(&self, content_id: &str) -> PaperboyResult<Option<Summary>> {
        let cache_key = summary_cache_key(content_id);

        if let Some(cached) = self.lookup::<Summary>(&cache_key).await {
            return Ok(Some(cached));
        }

        let summary = self.inner.find_by_key(content_id).await?;
        if let Some(ref summary) = summary {
            self.fill(&cache_key, summary).await;
        }

        Ok(summary)
    }

    #[instrument(skip(self))]
    async fn find_range(&self, query: &RangeQuery) -> PaperboyResult<SummaryPage> {
        let cache_key = summaries_cache_key(query);

        if let Some(cached) = self.lookup::<SummaryPage>(&cache_key).await {
            return Ok(cached);
        }

        let page = self.inner.find_range(query).await?;
        self.fill(&cache_key, &page).await;

        Ok(page)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> PaperboyResult<Vec<Summary>> {
        self.inner.search(query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use paperboy_testing_utils::{MockSummaryRepository, SummaryBuilder};

    /// Cache that fails or stalls every operation
    struct BrokenCache {
        stall: bool,
    }

    #[async_trait]
    impl CacheService for BrokenCache {
        async fn get(&self, _key: &str) -> PaperboyResult<Option<Vec<u8>>> {
            if self.stall {
                std::future::pending::<()>().await;
            }
            Err(PaperboyError::CacheUnavailable("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> PaperboyResult<()> {
            if self.stall {
                std::future::pending::<()>().await;
            }
            Err(PaperboyError::CacheUnavailable("connection refused".to_string()))
        }
    }

    fn setup(store: &MockSummaryRepository) -> (CachedSummaryRepository, Arc<InMemoryCache>) {
        let cache = Arc::new(InMemoryCache::new());
        let repo = CachedSummaryRepository::new(Arc::new(store.clone()), cache.clone());
        (repo, cache)
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let store = MockSummaryRepository::with_summaries(vec![SummaryBuilder::new("world/1").build()]);
        let (repo, _) = setup(&store);

        let first = repo.find_by_key("world/1").await.unwrap();
        assert_eq!(store.read_calls(), 1);

        let second = repo.find_by_key("world/1").await.unwrap();
        assert_eq!(store.read_calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_absent_summary_is_not_cached() {
        let store = MockSummaryRepository::new();
        let (repo, cache) = setup(&store);

        assert!(repo.find_by_key("missing").await.unwrap().is_none());
        assert!(repo.find_by_key("missing").await.unwrap().is_none());
        assert_eq!(store.read_calls(), 2);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_range_reads_are_cached_per_query() {
        let store = MockSummaryRepository::with_summaries(vec![
            SummaryBuilder::new("world/1").build(),
            SummaryBuilder::new("tech/1").with_section("technology", "Technology").build(),
        ]);
        let (repo, _) = setup(&store);

        let world = RangeQuery::latest(Some("world".to_string()), 10);
        let page = repo.find_range(&world).await.unwrap();
        assert_eq!(page.summaries.len(), 1);
        repo.find_range(&world).await.unwrap();
        assert_eq!(store.read_calls(), 1);

        let all = repo.find_range(&RangeQuery::latest(None, 10)).await.unwrap();
        assert_eq!(all.summaries.len(), 2);
        assert_eq!(store.read_calls(), 2);
    }

    #[tokio::test]
    async fn test_write_passes_through_and_reads_may_be_stale() {
        let store = MockSummaryRepository::with_summaries(vec![
            SummaryBuilder::new("world/1").with_title("Old").build(),
        ]);
        let (repo, _) = setup(&store);

        assert_eq!(repo.find_by_key("world/1").await.unwrap().unwrap().article.title, "Old");

        repo.create(&SummaryBuilder::new("world/1").with_title("New").build())
            .await
            .unwrap();
        assert_eq!(store.create_calls(), 1);
        assert_eq!(store.get("world/1").unwrap().article.title, "New");

        let cached = repo.find_by_key("world/1").await.unwrap().unwrap();
        assert_eq!(cached.info.content_id, "world/1");
        assert_eq!(cached.article.title, "Old");
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated_and_not_cached() {
        let store = MockSummaryRepository::with_summaries(vec![SummaryBuilder::new("world/1").build()]);
        let (repo, cache) = setup(&store);
        store.set_fail_reads(true);

        let err = repo.find_by_key("world/1").await.unwrap_err();
        assert!(matches!(err, PaperboyError::StoreFailed(_)));
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_undecodable_entry_counts_as_miss() {
        let store = MockSummaryRepository::with_summaries(vec![SummaryBuilder::new("world/1").build()]);
        let (repo, cache) = setup(&store);
        cache
            .set(&summary_cache_key("world/1"), b"not json", DEFAULT_CACHE_TTL)
            .await
            .unwrap();

        assert!(repo.find_by_key("world/1").await.unwrap().is_some());
        assert_eq!(store.read_calls(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_cache_falls_back_to_store() {
        let store = MockSummaryRepository::with_summaries(vec![SummaryBuilder::new("world/1").build()]);
        let repo = CachedSummaryRepository::new(
            Arc::new(store.clone()),
            Arc::new(BrokenCache { stall: false }),
        );

        assert!(repo.find_by_key("world/1").await.unwrap().is_some());
        assert!(repo.find_by_key("world/1").await.unwrap().is_some());
        assert_eq!(store.read_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_cache_times_out_as_miss() {
        let store = MockSummaryRepository::with_summaries(vec![SummaryBuilder::new("world/1").build()]);
        let repo = CachedSummaryRepository::new(
            Arc::new(store.clone()),
            Arc::new(BrokenCache { stall: true }),
        );

        let started = tokio::time::Instant::now();
        assert!(repo.find_by_key("world/1").await.unwrap().is_some());
        assert_eq!(store.read_calls(), 1);
        assert!(started.elapsed() >= DEFAULT_CACHE_TIMEOUT);
    }

    #[tokio::test]
    async fn test_search_is_never_cached() {
        let store = MockSummaryRepository::with_summaries(vec![
            SummaryBuilder::new("world/1").with_title("Climate talks stall").build(),
        ]);
        let (repo, cache) = setup(&store);

        assert_eq!(repo.search("climate", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("climate", 10).await.unwrap().len(), 1);
        assert_eq!(store.search_calls(), 2);
        assert_eq!(cache.len().await, 0);
    }
}
