//! No-op cache provider for deployments with caching disabled.

use std::time::Duration;

use async_trait::async_trait;

use herald_core::result::AppResult;
use herald_core::traits::cache::CacheProvider;

/// Cache provider that stores nothing. Every read misses, so consumers
/// fall back to cold computation on each call.
#[derive(Debug, Clone, Default)]
pub struct NoopCacheProvider;

impl NoopCacheProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheProvider for NoopCacheProvider {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn flush_all(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_never_stores() {
        let cache = NoopCacheProvider::new();
        cache
            .set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(!cache.exists("k").await.unwrap());
    }
}
