//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use herald_core::config::cache::CacheConfig;
use herald_core::result::AppResult;
use herald_core::traits::cache::CacheProvider;

/// In-memory cache provider using moka.
///
/// Moka's builder-level TTL applies uniformly, so per-call TTLs are
/// enforced with an explicit deadline stored next to each value; the
/// builder TTL acts as an upper bound.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, (String, Instant)>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.counts_ttl_seconds))
            .build();
        Self { cache }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        match self.cache.get(key).await {
            Some((value, deadline)) if Instant::now() < deadline => Ok(Some(value)),
            Some(_) => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let deadline = Instant::now() + ttl;
        self.cache
            .insert(key.to_string(), (value.to_string(), deadline))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn flush_all(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        debug!("Flushed all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&CacheConfig::default())
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = provider();
        cache
            .set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(cache.exists("k").await.unwrap());

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_per_entry_ttl_expires() {
        let cache = provider();
        cache.set("k", "v", Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_helpers_through_dyn_handle() {
        let cache: std::sync::Arc<dyn CacheProvider> = std::sync::Arc::new(provider());
        cache
            .set_json("nums", &vec![1u64, 2, 3], Duration::from_secs(60))
            .await
            .unwrap();
        let back: Option<Vec<u64>> = cache.get_json("nums").await.unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
        assert_eq!(cache.get_json::<Vec<u64>>("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_flush_all() {
        let cache = provider();
        cache
            .set("a", "1", Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("b", "2", Duration::from_secs(60))
            .await
            .unwrap();
        cache.flush_all().await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert_eq!(cache.get("b").await.unwrap(), None);
    }
}
