//! Cache factory for creating cached repository instances

use super::{
    manager::RedisCacheManager, memory::InMemoryCache, repository::CachedSummaryRepository,
    CacheService,
};
use paperboy_core::config::CacheConfig;
use paperboy_core::traits::SummaryRepository;
use std::sync::Arc;
use tracing::{info, warn};

/// Cache factory for creating cached repository instances
pub struct CacheFactory {
    cache_service: Option<Arc<dyn CacheService>>,
    config: CacheConfig,
}

impl CacheFactory {
    /// Create new cache factory
    pub fn new(config: CacheConfig) -> Self {
        Self {
            cache_service: None,
            config,
        }
    }

    /// Initialize the cache backend
    ///
    /// Uses Redis when enabled; if Redis cannot be reached the in-memory
    /// backend takes its place so that reads keep being cached.
    pub async fn initialize(&mut self) {
        if !self.config.enabled {
            info!("Cache is disabled, skipping initialization");
            return;
        }

        info!("Initializing cache service with Redis URL: {}", self.config.redis_url);

        let cache_service: Arc<dyn CacheService> =
            match RedisCacheManager::new(&self.config).await {
                Ok(manager) => Arc::new(manager),
                Err(e) => {
                    warn!("Redis unavailable, falling back to in-memory cache: {}", e);
                    Arc::new(InMemoryCache::new())
                }
            };

        self.cache_service = Some(cache_service);
        info!("Cache service initialized successfully");
    }

    /// Get the cache service
    pub fn cache_service(&self) -> Option<Arc<dyn CacheService>> {
        self.cache_service.clone()
    }

    /// Wrap a summary repository with the cache, or return it unchanged when
    /// caching is disabled
    pub fn create_cached_summary_repository(
        &self,
        inner: Arc<dyn SummaryRepository>,
    ) -> Arc<dyn SummaryRepository> {
        if let Some(ref cache_service) = self.cache_service {
            let cached_repo = CachedSummaryRepository::new(inner, cache_service.clone())
                .with_ttl(self.config.ttl())
                .with_timeout(self.config.command_timeout());
            Arc::new(cached_repo) as Arc<dyn SummaryRepository>
        } else {
            inner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperboy_testing_utils::{MockSummaryRepository, SummaryBuilder};

    #[tokio::test]
    async fn test_disabled_cache_returns_inner_repository() {
        let mut factory = CacheFactory::new(CacheConfig {
            enabled: false,
            ..Default::default()
        });
        factory.initialize().await;
        assert!(factory.cache_service().is_none());

        let store = MockSummaryRepository::with_summaries(vec![SummaryBuilder::new("a").build()]);
        let repo = factory.create_cached_summary_repository(Arc::new(store.clone()));
        repo.find_by_key("a").await.unwrap();
        repo.find_by_key("a").await.unwrap();
        assert_eq!(store.read_calls(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_memory() {
        let mut factory = CacheFactory::new(CacheConfig {
            redis_url: "redis://127.0.0.1:1".to_string(),
            ..Default::default()
        });
        factory.initialize().await;
        assert!(factory.cache_service().is_some());

        let store = MockSummaryRepository::with_summaries(vec![SummaryBuilder::new("a").build()]);
        let repo = factory.create_cached_summary_repository(Arc::new(store.clone()));
        repo.find_by_key("a").await.unwrap();
        repo.find_by_key("a").await.unwrap();
        assert_eq!(store.read_calls(), 1);
    }
}
