//! Caching infrastructure for summary reads
//!
//! A `CacheService` stores raw bytes with a TTL. Two backends are provided:
//! Redis for deployments and an in-process map used when Redis is disabled
//! or unreachable. `CachedSummaryRepository` puts either one in front of a
//! `SummaryRepository`.

pub mod factory;
pub mod manager;
pub mod memory;
pub mod repository;

use async_trait::async_trait;
use chrono::SecondsFormat;
pub use factory::*;
pub use manager::*;
pub use memory::*;
pub use repository::*;

use paperboy_core::models::RangeQuery;
use paperboy_core::{PaperboyError, PaperboyResult};

/// Cache key prefix patterns for different data types
#[derive(Debug, Clone, PartialEq)]
pub enum CachePrefix {
    Summary,
    Summaries,
}

impl CachePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePrefix::Summary => "summary",
            CachePrefix::Summaries => "summaries",
        }
    }
}

/// Cache service trait for dependency injection
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Get a value from cache as raw bytes; expired entries are `None`
    async fn get(&self, key: &str) -> PaperboyResult<Option<Vec<u8>>>;

    /// Set a value in cache with TTL
    async fn set(&self, key: &str, value: &[u8], ttl: std::time::Duration) -> PaperboyResult<()>;
}

/// Extension trait for convenient type-safe caching
#[async_trait]
pub trait CacheServiceExt: Send + Sync {
    /// Get a typed value from cache
    async fn get_typed<T>(&self, key: &str) -> PaperboyResult<Option<T>>
    where
        T: serde::de::DeserializeOwned + Send + Sync;

    /// Set a typed value in cache with TTL
    async fn set_typed<T>(
        &self,
        key: &str,
        value: &T,
        ttl: std::time::Duration,
    ) -> PaperboyResult<()>
    where
        T: serde::Serialize + Send + Sync;
}

#[async_trait]
impl<T: CacheService + ?Sized> CacheServiceExt for T {
    async fn get_typed<U>(&self, key: &str) -> PaperboyResult<Option<U>>
    where
        U: serde::de::DeserializeOwned + Send + Sync,
    {
        match self.get(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| PaperboyError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set_typed<U>(
        &self,
        key: &str,
        value: &U,
        ttl: std::time::Duration,
    ) -> PaperboyResult<()>
    where
        U: serde::Serialize + Send + Sync,
    {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, &bytes, ttl).await
    }
}

/// Build cache key with prefix
pub fn build_cache_key(prefix: CachePrefix, id: &str) -> String {
    format!("{}:{}", prefix.as_str(), id)
}

/// Build cache key with multiple segments
pub fn build_cache_key_multi(prefix: CachePrefix, segments: &[&str]) -> String {
    let key = segments.join(":");
    format!("{}:{}", prefix.as_str(), key)
}

/// Generate cache key for a single summary
pub fn summary_cache_key(content_id: &str) -> String {
    build_cache_key(CachePrefix::Summary, content_id)
}

/// Generate cache key for a page of summaries
///
/// `summaries:{section|all}:{before|latest}:{limit}`
pub fn summaries_cache_key(query: &RangeQuery) -> String {
    let before = query
        .before
        .map(|b| b.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| "latest".to_string());
    let limit = query.limit.to_string();

    build_cache_key_multi(
        CachePrefix::Summaries,
        &[
            query.section.as_deref().unwrap_or("all"),
            &before,
            &limit,
        ],
    )
}
