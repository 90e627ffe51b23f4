//! In-process cache backend

use super::CacheService;
use async_trait::async_trait;
use paperboy_core::PaperboyResult;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Minimum spacing between two sweeps of expired entries
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

struct Entries {
    map: HashMap<String, Entry>,
    next_sweep: Instant,
}

impl Default for Entries {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            next_sweep: Instant::now() + SWEEP_INTERVAL,
        }
    }
}

impl Entries {
    fn sweep_expired(&mut self, now: Instant) {
        if now < self.next_sweep {
            return;
        }

        let before = self.map.len();
        self.map.retain(|_, entry| entry.expires_at > now);
        self.next_sweep = now + SWEEP_INTERVAL;

        let swept = before - self.map.len();
        if swept > 0 {
            debug!("Swept {} expired cache entries", swept);
        }
    }
}

/// `CacheService` backed by a map in process memory
///
/// Expired entries are dropped when read, and swept from the whole map on
/// write at most once per `SWEEP_INTERVAL`, so keys that are never read
/// again do not accumulate.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<Entries>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }
}

#[async_trait]
impl CacheService for InMemoryCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> PaperboyResult<Option<Vec<u8>>> {
        let mut entries = self.entries.write().await;

        let expired = match entries.map.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!("Cache HIT: {}", key);
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.map.remove(key);
        }
        debug!("Cache MISS: {}", key);
        Ok(None)
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> PaperboyResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.sweep_expired(now);
        entries.map.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("summary:a", b"{}", Duration::from_secs(3600))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert_eq!(cache.get("summary:a").await.unwrap(), Some(b"{}".to_vec()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("summary:a").await.unwrap(), None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_expired_entries_are_swept_on_write() {
        let cache = InMemoryCache::new();
        for i in 0..1000 {
            let key = format!("summaries:all:2024-03-01T10:00:{i:02}.000Z:10");
            cache.set(&key, b"[]", Duration::from_secs(1)).await.unwrap();
        }
        assert_eq!(cache.len().await, 1000);

        tokio::time::advance(Duration::from_secs(3600)).await;
        cache
            .set("summaries:all:latest:10", b"[]", Duration::from_secs(3600))
            .await
            .unwrap();

        assert_eq!(cache.len().await, 1);
        assert_eq!(
            cache.get("summaries:all:latest:10").await.unwrap(),
            Some(b"[]".to_vec())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_entries_survive_sweep() {
        let cache = InMemoryCache::new();
        cache.set("short", b"1", Duration::from_secs(1)).await.unwrap();
        cache.set("long", b"2", Duration::from_secs(7200)).await.unwrap();

        tokio::time::advance(SWEEP_INTERVAL).await;
        cache.set("other", b"3", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("long").await.unwrap(), Some(b"2".to_vec()));
    }
}
