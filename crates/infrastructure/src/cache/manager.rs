//! Redis cache manager implementation

use super::CacheService;
use async_trait::async_trait;
use paperboy_core::config::CacheConfig;
use paperboy_core::{PaperboyError, PaperboyResult};
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis cache manager with a shared multiplexed connection
#[derive(Clone)]
pub struct RedisCacheManager {
    /// Reconnecting multiplexed connection, cheap to clone per command
    conn: ConnectionManager,
    /// Key prefix for this instance
    key_prefix: String,
    /// Upper bound for a single Redis command
    command_timeout: Duration,
}

impl RedisCacheManager {
    /// Connect to Redis and verify the connection with PING
    pub async fn new(config: &CacheConfig) -> PaperboyResult<Self> {
        if !config.enabled {
            return Err(PaperboyError::Configuration("Cache is disabled".to_string()));
        }

        info!("Creating Redis cache manager with URL: {}", config.redis_url);

        let client = redis::Client::open(config.redis_url.clone())
            .map_err(|e| PaperboyError::CacheUnavailable(e.to_string()))?;

        let mut conn = tokio::time::timeout(CONNECT_TIMEOUT, client.get_connection_manager())
            .await
            .map_err(|_| PaperboyError::CacheUnavailable("connection timed out".to_string()))?
            .map_err(|e| PaperboyError::CacheUnavailable(e.to_string()))?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| PaperboyError::CacheUnavailable(e.to_string()))?;

        info!("Redis cache manager created successfully");

        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
            command_timeout: config.command_timeout(),
        })
    }

    /// Build full cache key with prefix
    fn build_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }

    /// Run one Redis command under the command timeout
    async fn run<T, F>(&self, op: &str, key: &str, fut: F) -> PaperboyResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        let result = match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(PaperboyError::CacheUnavailable(e.to_string())),
            Err(_) => Err(PaperboyError::CacheUnavailable(format!(
                "{} timed out after {:?}",
                op, self.command_timeout
            ))),
        };

        if let Err(ref e) = result {
            error!("Cache {} failed for key {}: {}", op, key, e);
        }
        result
    }
}

#[async_trait]
impl CacheService for RedisCacheManager {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> PaperboyResult<Option<Vec<u8>>> {
        let full_key = self.build_key(key);
        debug!("Cache GET: {}", full_key);

        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = self
            .run(
                "GET",
                &full_key,
                redis::cmd("GET").arg(&full_key).query_async(&mut conn),
            )
            .await?;

        match result {
            Some(value) => {
                debug!("Cache HIT: {}", full_key);
                Ok(Some(value))
            }
            None => {
                debug!("Cache MISS: {}", full_key);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> PaperboyResult<()> {
        let full_key = self.build_key(key);
        debug!("Cache SET: {} with TTL: {:?}", full_key, ttl);

        let mut conn = self.conn.clone();
        let ttl_seconds = ttl.as_secs().max(1);
        let _: () = self
            .run(
                "SET",
                &full_key,
                redis::cmd("SETEX")
                    .arg(&full_key)
                    .arg(ttl_seconds)
                    .arg(value)
                    .query_async(&mut conn),
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache_is_rejected() {
        let config = CacheConfig {
            enabled: false,
            ..Default::default()
        };

        let result = RedisCacheManager::new(&config).await;
        assert!(matches!(result, Err(PaperboyError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_is_unavailable() {
        let config = CacheConfig {
            redis_url: "not-a-redis-url".to_string(),
            ..Default::default()
        };

        let result = RedisCacheManager::new(&config).await;
        assert!(matches!(result, Err(PaperboyError::CacheUnavailable(_))));
    }
}
