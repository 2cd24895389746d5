//! Runtime cache provider selection.

use std::sync::Arc;

use tracing::info;

use herald_core::config::cache::CacheConfig;
use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::traits::cache::CacheProvider;

use crate::memory::MemoryCacheProvider;
use crate::noop::NoopCacheProvider;

/// Build the configured cache provider.
pub fn from_config(config: &CacheConfig) -> AppResult<Arc<dyn CacheProvider>> {
    match config.provider.as_str() {
        "memory" => {
            info!(
                max_capacity = config.max_capacity,
                ttl_seconds = config.counts_ttl_seconds,
                "Using in-memory cache provider"
            );
            Ok(Arc::new(MemoryCacheProvider::new(config)))
        }
        "noop" => {
            info!("Caching disabled");
            Ok(Arc::new(NoopCacheProvider::new()))
        }
        other => Err(AppError::configuration(format!(
            "Unknown cache provider '{other}', expected 'memory' or 'noop'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_rejected() {
        let config = CacheConfig {
            provider: "redis".to_string(),
            ..CacheConfig::default()
        };
        assert!(from_config(&config).is_err());
    }
}
